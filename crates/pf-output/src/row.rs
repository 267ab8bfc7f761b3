//! Flat row types written by tabular backends.

use pf_metrics::MetricResult;
use pf_sim::SimulationResult;

/// One finalized metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub metric:      String,
    /// `count` or the aggregation name.
    pub aggregation: &'static str,
    pub value:       f64,
    /// Empty for counts.
    pub samples:     Option<usize>,
}

impl MetricRow {
    pub fn new(name: &str, result: &MetricResult) -> Self {
        Self {
            metric:      name.to_owned(),
            aggregation: result.kind(),
            value:       result.value(),
            samples:     result.samples(),
        }
    }

    /// Rows for every metric of a result, in name order.
    pub fn from_result(result: &SimulationResult) -> Vec<MetricRow> {
        result.metrics.iter().map(|(name, r)| MetricRow::new(name, r)).collect()
    }
}
