//! `pf-resource` — finite-capacity resources shared by process units.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                    |
//! |------------|-------------------------------------------------------------|
//! | [`pool`]   | `ResourcePool`, `Token`, `AcquireOutcome`, `Grant`          |
//! | [`error`]  | `ResourceError`, `ResourceResult<T>`                        |
//!
//! # Protocol
//!
//! ```text
//! acquire(resource, unit, priority) ──▶ Granted(token)      held < capacity
//!                                   └─▶ Queued              unit waits
//!
//! release(token) ──▶ Some(Grant { unit, token })            head waiter served
//!                └─▶ None                                   queue empty
//! ```
//!
//! A `Token` is move-only, so it can be released at most once.  Releasing a
//! token the pool does not consider held is a programming error and panics.

pub mod error;
pub mod pool;


pub use error::{ResourceError, ResourceResult};
pub use pool::{AcquireOutcome, Grant, ResourcePool, Token};
