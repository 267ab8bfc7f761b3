//! `pf-output` — reports and writers for finished simulation runs.
//!
//! A [`SimulationReport`] is the engine's result plus the insight rules that
//! fired against it.  Reports can be written by any [`ReportWriter`]:
//!
//! | Feature   | Backend | Files created                      |
//! |-----------|---------|------------------------------------|
//! | *(none)*  | CSV     | `metrics.csv`, `insights.csv`      |
//! | *(none)*  | JSON    | caller-supplied `io::Write`        |
//! | `sqlite`  | SQLite  | `report.db`                        |
//!
//! [`ReportObserver`] implements `pf_sim::SimObserver` and writes the report
//! as soon as the run ends.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pf_output::{CsvReportWriter, ReportObserver};
//!
//! let writer = CsvReportWriter::new(Path::new("./out"))?;
//! let mut obs = ReportObserver::new(writer, sim.config());
//! sim.run(&mut obs);
//! if let Some(e) = obs.take_error() { eprintln!("output error: {e}"); }
//! ```

pub mod csv;
pub mod error;
pub mod json;
pub mod observer;
pub mod report;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use crate::csv::CsvReportWriter;
pub use error::{OutputError, OutputResult};
pub use json::write_report_json;
pub use observer::ReportObserver;
pub use report::{Insight, SimulationReport, evaluate_insights};
pub use row::MetricRow;
pub use writer::ReportWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteReportWriter;
