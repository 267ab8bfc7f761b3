//! Finalized metric values and the reducers that produce them.

use serde::ser::{Serialize, SerializeMap, Serializer};

use pf_config::Aggregation;

/// One entry of a run's `metrics` map.
///
/// Serializes as a bare integer for counts and as
/// `{"<aggregation>": value, "samples": n}` otherwise.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricResult {
    Count(u64),
    Aggregated {
        aggregation: Aggregation,
        value:       f64,
        samples:     usize,
    },
}

impl MetricResult {
    /// Reduce `samples` with `aggregation`.  No samples gives `0`.
    pub fn from_samples(aggregation: Aggregation, samples: &[f64]) -> Self {
        MetricResult::Aggregated {
            aggregation,
            value: aggregate(aggregation, samples),
            samples: samples.len(),
        }
    }

    /// The headline number: the count, or the aggregated value.
    pub fn value(&self) -> f64 {
        match self {
            MetricResult::Count(n) => *n as f64,
            MetricResult::Aggregated { value, .. } => *value,
        }
    }

    /// Sample count behind an aggregated value; `None` for counts.
    pub fn samples(&self) -> Option<usize> {
        match self {
            MetricResult::Count(_) => None,
            MetricResult::Aggregated { samples, .. } => Some(*samples),
        }
    }

    /// `"count"` or the aggregation name.
    pub fn kind(&self) -> &'static str {
        match self {
            MetricResult::Count(_) => "count",
            MetricResult::Aggregated { aggregation, .. } => aggregation.as_str(),
        }
    }
}

impl Serialize for MetricResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricResult::Count(n) => serializer.serialize_u64(*n),
            MetricResult::Aggregated { aggregation, value, samples } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(aggregation.as_str(), value)?;
                map.serialize_entry("samples", samples)?;
                map.end()
            }
        }
    }
}

/// Apply `aggregation` to `samples`.  An empty slice reduces to `0.0`.
pub fn aggregate(aggregation: Aggregation, samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    match aggregation {
        Aggregation::Sum     => samples.iter().sum(),
        Aggregation::Max     => samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Aggregation::Min     => samples.iter().copied().fold(f64::INFINITY, f64::min),
        Aggregation::Average => samples.iter().sum::<f64>() / samples.len() as f64,
    }
}
