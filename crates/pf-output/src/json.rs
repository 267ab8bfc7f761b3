//! JSON report output.

use std::io::Write;

use crate::{OutputResult, SimulationReport};

/// Write `report` as pretty-printed JSON followed by a newline.
pub fn write_report_json<W: Write>(report: &SimulationReport, mut writer: W) -> OutputResult<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
