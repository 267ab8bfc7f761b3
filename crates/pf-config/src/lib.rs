//! `pf-config` — simulation configuration for the procflow engine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                         |
//! |---------------|------------------------------------------------------------------|
//! | [`model`]     | Wire types: `SimulationConfig`, `ResourceDef`, `ProcessDef`, …   |
//! | [`guard`]     | `Guard` — sandboxed predicate grammar over entity attributes     |
//! | [`validate`]  | `ValidatedConfig` and the fail-fast validation pass              |
//! | [`loader`]    | `load_config_json`, `load_config_reader`, `load_validated_json`  |
//! | [`error`]     | `Violation`, `ConfigError`, `LoadError`                          |
//!
//! # Lifecycle
//!
//! ```text
//! JSON ──load──▶ SimulationConfig ──validate──▶ ValidatedConfig ──▶ pf-sim
//!                                     │
//!                                     └─▶ ConfigError { violations: [..all..] }
//! ```

pub mod error;
pub mod guard;
pub mod loader;
pub mod model;
pub mod validate;

#[cfg(test)]
mod tests;

pub use error::{ConfigError, ConfigResult, LoadError, LoadResult, Violation};
pub use guard::{CmpOp, Guard, GuardError, GuardParseError, MAX_GUARD_NESTING, MAX_GUARD_TERMS};
pub use loader::{load_config_json, load_config_reader, load_validated_json};
pub use model::{
    Aggregation, InsightCondition, InsightRule, MetricDef, MetricUnit, ProcessDef, ResourceDef,
    SimulationConfig,
};
pub use validate::{
    MetricSpec, ProcessSpec, ResourceSpec, UTILIZATION_SUFFIX, ValidatedConfig, utilization_key,
};
