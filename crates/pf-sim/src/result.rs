//! The value a run hands back to its caller.

use std::collections::BTreeMap;

use serde::Serialize;

use pf_core::Tick;
use pf_metrics::MetricResult;

/// `{ "simulation_time": …, "metrics": { name: result } }`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Logical time at which the run stopped; always the configured horizon.
    pub simulation_time: Tick,
    pub metrics:         BTreeMap<String, MetricResult>,
}

impl SimulationResult {
    pub fn metric(&self, name: &str) -> Option<&MetricResult> {
        self.metrics.get(name)
    }
}

/// Engine-side counters for one run.  Not part of the serialized result.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub entities_created: u64,
    /// Units that passed their guard and started acquiring resources.
    pub process_starts:   u64,
    pub completions:      u64,
    pub guard_skips:      u64,
    /// Units still suspended when the horizon was reached.
    pub abandoned_units:  usize,
}
