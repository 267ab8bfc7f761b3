//! `ReportObserver<W>` — bridges `SimObserver` to a `ReportWriter`.

use pf_config::ValidatedConfig;
use pf_sim::{SimObserver, SimulationResult};

use crate::writer::ReportWriter;
use crate::{OutputError, SimulationReport};

/// A [`SimObserver`] that builds a [`SimulationReport`] when the run ends and
/// writes it to any [`ReportWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct ReportObserver<W: ReportWriter> {
    writer:     W,
    config:     ValidatedConfig,
    report:     Option<SimulationReport>,
    last_error: Option<OutputError>,
}

impl<W: ReportWriter> ReportObserver<W> {
    /// Create an observer backed by `writer`; `config` supplies the insight
    /// rules and metric targets.
    pub fn new(writer: W, config: &ValidatedConfig) -> Self {
        Self {
            writer,
            config:     config.clone(),
            report:     None,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Take the report built at the end of the run.
    pub fn take_report(&mut self) -> Option<SimulationReport> {
        self.report.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: ReportWriter> SimObserver for ReportObserver<W> {
    fn on_sim_end(&mut self, result: &SimulationResult) {
        let report = SimulationReport::new(result.clone(), &self.config);
        if let Err(e) = self.writer.write_report(&report) {
            tracing::error!(error = %e, "failed to write simulation report");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
        self.report = Some(report);
    }
}
