//! Error types for pf-config.

use std::fmt;

use thiserror::Error;

use crate::guard::GuardParseError;

/// One problem found while validating a [`SimulationConfig`][crate::SimulationConfig].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Violation {
    #[error("simulation duration must be non-negative, got {0}")]
    NegativeHorizon(i64),

    #[error("entities_per_hour must be a positive finite number, got {0}")]
    InvalidArrivalRate(f64),

    #[error("duplicate {kind} name {name:?}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("resource {resource:?} capacity must be between 1 and {max}, got {capacity}", max = u32::MAX)]
    InvalidCapacity { resource: String, capacity: i64 },

    #[error("process {process:?} duration must be non-negative, got {duration}")]
    NegativeDuration { process: String, duration: i64 },

    #[error("process {process:?} requires no resources; at least one is required")]
    NoRequiredResources { process: String },

    #[error("process {process:?} requires unknown resource {resource:?}")]
    UnknownResource { process: String, resource: String },

    #[error("process {process:?} lists resource {resource:?} more than once")]
    DuplicateRequirement { process: String, resource: String },

    #[error("process {process:?} names unknown successor {successor:?}")]
    UnknownSuccessor { process: String, successor: String },

    #[error("process {process:?} has an invalid condition: {error}")]
    InvalidGuard { process: String, error: GuardParseError },

    #[error("zero-duration cycle through processes {0:?} would never advance the clock")]
    ZeroDurationCycle(Vec<String>),

    #[error("metric {metric:?} collides with the utilization series of resource {resource:?}")]
    ReservedMetricName { metric: String, resource: String },

    #[error("insight rule references unknown metric {0:?}")]
    UnknownInsightMetric(String),

    #[error("insight rule for {metric:?} has unknown condition {condition:?}")]
    UnknownInsightCondition { metric: String, condition: String },
}

/// Every violation found in a configuration.  Never empty.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("invalid simulation configuration ({} violation(s)): {}", .violations.len(), ViolationList(.violations))]
pub struct ConfigError {
    pub violations: Vec<Violation>,
}

struct ViolationList<'a>(&'a [Violation]);

impl fmt::Display for ViolationList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from reading a configuration document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

pub type LoadResult<T> = Result<T, LoadError>;
