//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `metrics.csv`  — `metric,aggregation,value,samples`
//! - `insights.csv` — `metric,condition,threshold,observed,recommendation`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::ReportWriter;
use crate::{Insight, MetricRow, OutputResult};

pub const METRICS_FILE: &str = "metrics.csv";
pub const INSIGHTS_FILE: &str = "insights.csv";

/// Writes a simulation report to two CSV files.
pub struct CsvReportWriter {
    metrics:  Writer<File>,
    insights: Writer<File>,
    finished: bool,
}

impl CsvReportWriter {
    /// Create the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut metrics = Writer::from_path(dir.join(METRICS_FILE))?;
        metrics.write_record(["metric", "aggregation", "value", "samples"])?;

        let mut insights = Writer::from_path(dir.join(INSIGHTS_FILE))?;
        insights.write_record(["metric", "condition", "threshold", "observed", "recommendation"])?;

        Ok(Self { metrics, insights, finished: false })
    }
}

impl ReportWriter for CsvReportWriter {
    fn write_metrics(&mut self, rows: &[MetricRow]) -> OutputResult<()> {
        for row in rows {
            self.metrics.write_record(&[
                row.metric.clone(),
                row.aggregation.to_owned(),
                row.value.to_string(),
                row.samples.map(|n| n.to_string()).unwrap_or_default(),
            ])?;
        }
        Ok(())
    }

    fn write_insights(&mut self, insights: &[Insight]) -> OutputResult<()> {
        for insight in insights {
            self.insights.write_record(&[
                insight.metric.clone(),
                insight.condition.to_string(),
                insight.threshold.to_string(),
                insight.observed.to_string(),
                insight.recommendation.clone(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.metrics.flush()?;
        self.insights.flush()?;
        Ok(())
    }
}
