//! Wire-format configuration types.
//!
//! These mirror the JSON document produced by the configuration front end
//! field for field (snake_case names, optional fields defaulted).  Numeric
//! fields that must be non-negative are deliberately signed here so that a
//! negative value survives deserialization and is reported by
//! [`SimulationConfig::validate`][crate::SimulationConfig::validate] together
//! with every other violation, instead of aborting the parse.
//!
//! # Example document
//!
//! ```json
//! {
//!   "title": "Grocery checkout",
//!   "duration": 28800,
//!   "entities_per_hour": 40,
//!   "resources": [
//!     { "name": "cashier", "capacity": 2, "cost_per_unit": 18.5, "efficiency_threshold": 0.8 }
//!   ],
//!   "processes": [
//!     { "name": "checkout", "duration": 180, "required_resources": ["cashier"],
//!       "expected_service_time": 180, "max_acceptable_wait": 300 }
//!   ],
//!   "target_metrics": [
//!     { "name": "served", "target_value": 300, "unit": "count", "description": "Customers served" }
//!   ],
//!   "insight_rules": [],
//!   "entity_attributes": { "basket": 12 }
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use pf_core::Attributes;

// ── SimulationConfig ─────────────────────────────────────────────────────────

/// Top-level simulation configuration, as received.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Free-form context handed through to report consumers.
    #[serde(default)]
    pub business_context: String,

    /// Logical horizon in ticks.  The run stops once the clock reaches it.
    pub duration: i64,

    pub resources: Vec<ResourceDef>,

    pub processes: Vec<ProcessDef>,

    /// Arrival rate; the generator waits `3600 / entities_per_hour` ticks
    /// between entities.
    pub entities_per_hour: f64,

    #[serde(default)]
    pub target_metrics: Vec<MetricDef>,

    #[serde(default)]
    pub insight_rules: Vec<InsightRule>,

    /// Attributes copied onto every generated entity.
    #[serde(default)]
    pub entity_attributes: Attributes,
}

// ── ResourceDef ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceDef {
    pub name: String,

    pub capacity: i64,

    #[serde(default)]
    pub cost_per_unit: f64,

    #[serde(default)]
    pub efficiency_threshold: f64,

    /// Serve queued requests by entity priority instead of FIFO.
    ///
    /// Accepts `true`/`false` or a number (non-zero means priority-ordered).
    #[serde(default, deserialize_with = "flag_or_number")]
    pub priority: bool,

    #[serde(default)]
    pub shared: bool,
}

// ── ProcessDef ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessDef {
    pub name: String,

    pub duration: i64,

    #[serde(default)]
    pub required_resources: Vec<String>,

    #[serde(default)]
    pub expected_service_time: f64,

    /// Informational only; never enforced by the engine.
    #[serde(default)]
    pub max_acceptable_wait: f64,

    /// Guard expression, e.g. `entity.age > 18 and entity.vip == true`.
    #[serde(default, alias = "guard")]
    pub condition: Option<String>,

    #[serde(default)]
    pub next_processes: Vec<String>,

    /// Re-enter this process after every completion.
    #[serde(default, rename = "loop")]
    pub repeat: bool,

    #[serde(default = "default_true")]
    pub release_resources: bool,
}

fn default_true() -> bool {
    true
}

// ── MetricDef ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricDef {
    pub name: String,

    #[serde(default)]
    pub target_value: f64,

    pub unit: MetricUnit,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub aggregation: Aggregation,
}

/// What a metric samples on every process completion.
///
/// Units outside the recordable set are kept verbatim in `Other` so the
/// configuration round-trips; such metrics never receive samples.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MetricUnit {
    /// +1 per completion.
    Count,
    /// Ticks from unit start (including queueing) to completion.
    Minutes,
    /// Elapsed over declared duration, × 100.
    Percentage,
    Other(String),
}

impl MetricUnit {
    pub fn as_str(&self) -> &str {
        match self {
            MetricUnit::Count      => "count",
            MetricUnit::Minutes    => "minutes",
            MetricUnit::Percentage => "percentage",
            MetricUnit::Other(s)   => s,
        }
    }
}

impl From<String> for MetricUnit {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "count"      => MetricUnit::Count,
            "minutes"    => MetricUnit::Minutes,
            "percentage" => MetricUnit::Percentage,
            _            => MetricUnit::Other(s),
        }
    }
}

impl From<MetricUnit> for String {
    fn from(unit: MetricUnit) -> Self {
        unit.as_str().to_owned()
    }
}

impl fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reducer applied to a metric's samples when the run ends.
///
/// Unrecognised names deserialize to [`Aggregation::Average`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Aggregation {
    Sum,
    Max,
    Min,
    #[default]
    Average,
}

impl Aggregation {
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregation::Sum     => "sum",
            Aggregation::Max     => "max",
            Aggregation::Min     => "min",
            Aggregation::Average => "average",
        }
    }
}

impl From<String> for Aggregation {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Aggregation::Sum,
            "max" => Aggregation::Max,
            "min" => Aggregation::Min,
            _     => Aggregation::Average,
        }
    }
}

impl From<Aggregation> for String {
    fn from(agg: Aggregation) -> Self {
        agg.as_str().to_owned()
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── InsightRule ──────────────────────────────────────────────────────────────

/// A recommendation attached to a final metric value.  Not simulated; read
/// by report consumers after the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsightRule {
    /// A declared metric name or a `<resource>_utilization` key.
    pub metric: String,

    pub condition: InsightCondition,

    pub threshold: f64,

    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InsightCondition {
    /// Fires when the observed value is strictly above `threshold`.
    AboveThreshold,
    /// Fires when the observed value is strictly below the metric's target
    /// (or `threshold` for metrics without a declared target).
    BelowTarget,
    /// Rejected by validation.
    Other(String),
}

impl InsightCondition {
    pub fn as_str(&self) -> &str {
        match self {
            InsightCondition::AboveThreshold => "above_threshold",
            InsightCondition::BelowTarget    => "below_target",
            InsightCondition::Other(s)       => s,
        }
    }
}

impl From<String> for InsightCondition {
    fn from(s: String) -> Self {
        match s.trim() {
            "above_threshold" => InsightCondition::AboveThreshold,
            "below_target"    => InsightCondition::BelowTarget,
            _                 => InsightCondition::Other(s),
        }
    }
}

impl From<InsightCondition> for String {
    fn from(c: InsightCondition) -> Self {
        c.as_str().to_owned()
    }
}

impl fmt::Display for InsightCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagOrNumber {
    Flag(bool),
    Number(f64),
}

fn flag_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<FlagOrNumber>::deserialize(deserializer)? {
        None                           => false,
        Some(FlagOrNumber::Flag(b))    => b,
        Some(FlagOrNumber::Number(n))  => n != 0.0,
    })
}
