//! The run's sample store.
//!
//! Declared metrics are indexed by `MetricId` and resource utilization
//! series by `ResourceId`, both in declaration order, so recording is a
//! direct `Vec` index.  Nothing is reduced until [`MetricsAggregator::finalize`]
//! except count metrics, which only ever need their running total.

use std::collections::BTreeMap;

use pf_config::{Aggregation, MetricSpec, MetricUnit, ResourceSpec, utilization_key};
use pf_core::ResourceId;

use crate::MetricResult;

#[derive(Clone, Debug)]
enum Accumulator {
    Count(u64),
    Elapsed(Vec<f64>),
    PercentOfDuration(Vec<f64>),
    /// Unit the engine does not know how to sample.
    Unrecorded,
}

#[derive(Clone, Debug)]
struct Series {
    name:        String,
    aggregation: Aggregation,
    acc:         Accumulator,
}

#[derive(Clone, Debug)]
pub struct MetricsAggregator {
    metrics:     Vec<Series>,
    utilization: Vec<(String, Vec<f64>)>,
    completions: u64,
}

impl MetricsAggregator {
    pub fn new(metrics: &[MetricSpec], resources: &[ResourceSpec]) -> Self {
        let metrics = metrics
            .iter()
            .map(|m| {
                let acc = match &m.unit {
                    MetricUnit::Count      => Accumulator::Count(0),
                    MetricUnit::Minutes    => Accumulator::Elapsed(Vec::new()),
                    MetricUnit::Percentage => Accumulator::PercentOfDuration(Vec::new()),
                    MetricUnit::Other(unit) => {
                        tracing::debug!(metric = %m.name, %unit, "unit is not recorded; metric stays empty");
                        Accumulator::Unrecorded
                    }
                };
                Series { name: m.name.clone(), aggregation: m.aggregation, acc }
            })
            .collect();
        let utilization = resources
            .iter()
            .map(|r| (utilization_key(&r.name), Vec::new()))
            .collect();
        Self { metrics, utilization, completions: 0 }
    }

    /// Record one process completion against every declared metric.
    ///
    /// `elapsed` is the number of ticks since the unit started (queueing
    /// included); `duration` is the process's configured duration.
    pub fn record_completion(&mut self, elapsed: u64, duration: u64) {
        self.completions += 1;
        for series in &mut self.metrics {
            match &mut series.acc {
                Accumulator::Count(n) => *n += 1,
                Accumulator::Elapsed(samples) => samples.push(elapsed as f64),
                Accumulator::PercentOfDuration(samples) if duration > 0 => {
                    samples.push(elapsed as f64 / duration as f64 * 100.0);
                }
                Accumulator::PercentOfDuration(_) | Accumulator::Unrecorded => {}
            }
        }
    }

    /// Append one utilization sample (percent) for `resource`.
    pub fn record_utilization(&mut self, resource: ResourceId, percent: f64) {
        self.utilization[resource.index()].1.push(percent);
    }

    /// Process completions recorded so far.
    pub fn completions(&self) -> u64 {
        self.completions
    }

    pub fn utilization_samples(&self, resource: ResourceId) -> &[f64] {
        &self.utilization[resource.index()].1
    }

    /// Reduce every series to its reported value.
    pub fn finalize(&self) -> BTreeMap<String, MetricResult> {
        let mut out = BTreeMap::new();
        for series in &self.metrics {
            let result = match &series.acc {
                Accumulator::Count(n) => MetricResult::Count(*n),
                Accumulator::Elapsed(s) | Accumulator::PercentOfDuration(s) => {
                    MetricResult::from_samples(series.aggregation, s)
                }
                Accumulator::Unrecorded => MetricResult::from_samples(series.aggregation, &[]),
            };
            out.insert(series.name.clone(), result);
        }
        for (key, samples) in &self.utilization {
            out.insert(key.clone(), MetricResult::from_samples(Aggregation::Average, samples));
        }
        tracing::debug!(entries = out.len(), completions = self.completions, "metrics finalized");
        out
    }
}
