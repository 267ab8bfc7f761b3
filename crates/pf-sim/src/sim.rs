//! The `Sim` struct and its event loop.

use std::collections::BTreeMap;
use std::rc::Rc;

use pf_config::{SimulationConfig, ValidatedConfig};
use pf_core::{Attributes, Clock, Tick, UnitId};
use pf_metrics::MetricsAggregator;
use pf_resource::{ResourcePool, Token};
use pf_schedule::EventQueue;

use crate::unit::{Step, Suspend, Unit};
use crate::{RunStats, SimBuilder, SimObserver, SimResult, SimulationResult};

/// Unit id reserved for the entity generator.
pub(crate) const GENERATOR: UnitId = UnitId(0);

// ── Sim ───────────────────────────────────────────────────────────────────────

/// One run of one configuration.
///
/// `Sim` owns every piece of mutable engine state: the clock, the future
/// event list, the live units, the resource pool, and the metric store.
/// The event loop is single-threaded and cooperative:
///
/// ```text
/// while next wake-up < horizon:
///   pop (tick, unit)        # earliest tick, then scheduling order
///   clock ← tick
///   resume unit until it suspends (Delay → re-queued, Resource → parked)
///                         or finishes (dropped)
/// clock ← horizon
/// ```
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub(crate) config:      Rc<ValidatedConfig>,
    pub(crate) clock:       Clock,
    pub(crate) queue:       EventQueue,
    pub(crate) pool:        ResourcePool,
    pub(crate) metrics:     MetricsAggregator,
    /// Live units: queued on the event list or parked on a resource.
    pub(crate) units:       BTreeMap<UnitId, Unit>,
    /// Tokens kept by processes that do not release their resources.
    pub(crate) retained:    Vec<Token>,
    pub(crate) seeded:      Vec<Attributes>,
    pub(crate) next_unit:   u64,
    pub(crate) next_entity: u64,
    pub(crate) stats:       RunStats,
    pub(crate) finished:    bool,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run until the clock reaches the configured horizon and return the
    /// aggregated result.
    ///
    /// Units still suspended at the horizon are abandoned, along with any
    /// tokens they hold.  Calling `run` again returns the same result
    /// without advancing anything.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimulationResult {
        let horizon = self.config.horizon;
        if !self.finished {
            tracing::info!(
                title     = %self.config.title,
                %horizon,
                resources = self.config.resources.len(),
                processes = self.config.processes.len(),
                "simulation started"
            );

            for attributes in std::mem::take(&mut self.seeded) {
                self.admit(&attributes, observer);
            }

            while let Some((tick, id)) = self.queue.pop_before(horizon) {
                self.clock.advance_to(tick);
                if let Some(unit) = self.units.remove(&id) {
                    self.resume(id, unit, observer);
                }
            }
            self.clock.advance_to(horizon);
            self.finished = true;
            self.stats.abandoned_units = self.units.len();
        }

        let result = self.result();
        tracing::info!(
            simulation_time = %result.simulation_time,
            entities        = self.stats.entities_created,
            completions     = self.stats.completions,
            abandoned       = self.stats.abandoned_units,
            "simulation finished"
        );
        observer.on_sim_end(&result);
        result
    }

    /// The current aggregated result.
    pub fn result(&self) -> SimulationResult {
        SimulationResult {
            simulation_time: self.clock.now(),
            metrics:         self.metrics.finalize(),
        }
    }

    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn metrics(&self) -> &MetricsAggregator {
        &self.metrics
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Units currently queued or waiting on a resource (the generator
    /// included).
    pub fn live_units(&self) -> usize {
        self.units.len()
    }

    /// Tokens held forever by processes with `release_resources: false`.
    pub fn retained_tokens(&self) -> usize {
        self.retained.len()
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    fn resume<O: SimObserver>(&mut self, id: UnitId, mut unit: Unit, observer: &mut O) {
        let step = match &mut unit {
            Unit::Generator(generator) => self.step_generator(generator, observer),
            Unit::Flow(flow)           => self.step_flow(id, flow, observer),
        };
        match step {
            Step::Done => {}
            Step::Suspend(Suspend::Delay(ticks)) => {
                self.queue.schedule_after(self.clock.now(), ticks, id);
                self.units.insert(id, unit);
            }
            Step::Suspend(Suspend::Resource(_)) => {
                self.units.insert(id, unit);
            }
        }
    }

    pub(crate) fn next_unit_id(&mut self) -> UnitId {
        let id = UnitId(self.next_unit);
        self.next_unit += 1;
        id
    }
}

/// Validate `config`, run it to its horizon, and return the result.
pub fn simulate(config: &SimulationConfig) -> SimResult<SimulationResult> {
    let mut sim = SimBuilder::new(config.clone()).build()?;
    Ok(sim.run(&mut crate::NoopObserver))
}
