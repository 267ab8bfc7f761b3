//! JSON configuration loader.
//!
//! The document format is described in [`crate::model`].  Loading only
//! parses; call [`SimulationConfig::validate`] (or use
//! [`load_validated_json`]) before handing the result to the engine.

use std::io::Read;
use std::path::Path;

use crate::{LoadError, LoadResult, SimulationConfig, ValidatedConfig};

/// Parse a configuration from a JSON file.
pub fn load_config_json(path: &Path) -> LoadResult<SimulationConfig> {
    let file = std::fs::File::open(path).map_err(LoadError::Io)?;
    load_config_reader(std::io::BufReader::new(file))
}

/// Like [`load_config_json`] but accepts any `Read` source.
///
/// Useful for testing (pass a byte slice) or for request bodies.
pub fn load_config_reader<R: Read>(reader: R) -> LoadResult<SimulationConfig> {
    let config: SimulationConfig = serde_json::from_reader(reader)?;
    tracing::debug!(
        title     = %config.title,
        resources = config.resources.len(),
        processes = config.processes.len(),
        "simulation configuration parsed"
    );
    Ok(config)
}

/// Parse and validate a configuration file in one step.
pub fn load_validated_json(path: &Path) -> LoadResult<ValidatedConfig> {
    Ok(load_config_json(path)?.validate()?)
}
