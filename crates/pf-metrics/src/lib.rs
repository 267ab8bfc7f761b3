//! `pf-metrics` — per-run metric accumulation and finalization.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`aggregator`]  | `MetricsAggregator` — samples collected during a run    |
//! | [`result`]      | `MetricResult`, `aggregate`                             |
//!
//! # What is recorded
//!
//! | Unit          | Sample per process completion                           |
//! |---------------|---------------------------------------------------------|
//! | `count`       | +1 (kept as a running integer)                          |
//! | `minutes`     | ticks from unit start to completion                     |
//! | `percentage`  | elapsed / process duration × 100 (skipped if duration 0)|
//! | anything else | nothing                                                 |
//!
//! Every resource also gets a `<resource>_utilization` series, one sample per
//! release, reported with `average`.

pub mod aggregator;
pub mod result;


pub use aggregator::MetricsAggregator;
pub use result::{MetricResult, aggregate};
