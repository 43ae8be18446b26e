//! Local config file source: ./tokenmix.toml in the working directory.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

pub const LOCAL_CONFIG_FILE: &str = "tokenmix.toml";

/// Add the local config file to builder when present.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    working_dir: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = working_dir.join(LOCAL_CONFIG_FILE);
    if !path.exists() {
        return Ok(builder);
    }
    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(false)))
}

/// Add an explicitly requested config file; it must exist.
pub fn add_required_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Message(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(true)))
}
