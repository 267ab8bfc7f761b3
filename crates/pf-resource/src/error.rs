//! Error types for pf-resource.

use thiserror::Error;

use pf_core::ResourceId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("{resource} has no token #{serial} outstanding")]
    NotHeld { resource: ResourceId, serial: u64 },

    #[error("{0} is not part of this pool")]
    UnknownResource(ResourceId),
}

pub type ResourceResult<T> = Result<T, ResourceError>;
