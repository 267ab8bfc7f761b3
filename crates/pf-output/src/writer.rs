//! The `ReportWriter` trait implemented by all backend writers.

use crate::{Insight, MetricRow, OutputResult, SimulationReport};

/// Trait implemented by the CSV and SQLite writers.
pub trait ReportWriter {
    /// Write one row per finalized metric.
    fn write_metrics(&mut self, rows: &[MetricRow]) -> OutputResult<()>;

    /// Write the insights that fired.
    fn write_insights(&mut self, insights: &[Insight]) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Must be idempotent.
    fn finish(&mut self) -> OutputResult<()>;

    /// Write a whole report and finish.
    fn write_report(&mut self, report: &SimulationReport) -> OutputResult<()> {
        self.write_metrics(&MetricRow::from_result(&report.result))?;
        self.write_insights(&report.insights)?;
        self.finish()
    }
}
