//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `report.db` file in the configured output directory with
//! two tables: `metrics` and `insights`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::ReportWriter;
use crate::{Insight, MetricRow, OutputResult};

pub const REPORT_DB: &str = "report.db";

/// Writes a simulation report to an SQLite database.
pub struct SqliteReportWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteReportWriter {
    /// Open (or create) `report.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join(REPORT_DB))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS metrics (
                 metric      TEXT PRIMARY KEY,
                 aggregation TEXT NOT NULL,
                 value       REAL NOT NULL,
                 samples     INTEGER
             );
             CREATE TABLE IF NOT EXISTS insights (
                 metric         TEXT NOT NULL,
                 condition      TEXT NOT NULL,
                 threshold      REAL NOT NULL,
                 observed       REAL NOT NULL,
                 recommendation TEXT NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl ReportWriter for SqliteReportWriter {
    fn write_metrics(&mut self, rows: &[MetricRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO metrics (metric, aggregation, value, samples) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.metric,
                    row.aggregation,
                    row.value,
                    row.samples.map(|n| n as i64),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_insights(&mut self, insights: &[Insight]) -> OutputResult<()> {
        for insight in insights {
            self.conn.execute(
                "INSERT INTO insights (metric, condition, threshold, observed, recommendation) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    insight.metric,
                    insight.condition.as_str(),
                    insight.threshold,
                    insight.observed,
                    insight.recommendation,
                ],
            )?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.cache_flush()?;
        Ok(())
    }
}
