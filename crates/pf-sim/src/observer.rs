//! Simulation observer trait for progress reporting and tracing.

use pf_config::{GuardError, ProcessSpec};
use pf_core::{Entity, Tick};

use crate::SimulationResult;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] as units progress.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: completion counter
///
/// ```rust,ignore
/// struct Completions(u64);
///
/// impl SimObserver for Completions {
///     fn on_process_complete(&mut self, _: Tick, _: &Entity, _: &ProcessSpec, _: u64) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// A new entity entered the system (generator or seeded arrival).
    fn on_entity_created(&mut self, _now: Tick, _entity: &Entity) {}

    /// A unit passed its guard and is about to request its resources.
    fn on_process_start(&mut self, _now: Tick, _entity: &Entity, _process: &ProcessSpec) {}

    /// A unit finished its timed execution.  `elapsed` counts from the unit's
    /// start, queueing included.
    fn on_process_complete(
        &mut self,
        _now:     Tick,
        _entity:  &Entity,
        _process: &ProcessSpec,
        _elapsed: u64,
    ) {}

    /// A unit's guard was not satisfied.  `error` is set when evaluation
    /// failed rather than returning `false`.
    fn on_guard_skipped(
        &mut self,
        _now:     Tick,
        _entity:  &Entity,
        _process: &ProcessSpec,
        _error:   Option<&GuardError>,
    ) {}

    /// Called once when the clock reaches the horizon.
    fn on_sim_end(&mut self, _result: &SimulationResult) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
