//! Profile file source: `<config_home>/bunnyshell/config.toml` or an explicit path.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Add the profile file to the builder. A missing file is only an error when
/// `required` is set.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.exists() {
        if required {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        debug!(config_path = %path.display(), "no config file, using defaults");
        return Ok(builder);
    }

    let path_str = path
        .to_str()
        .ok_or_else(|| ConfigError::Message(format!("non UTF-8 config path: {:?}", path)))?;
    Ok(builder.add_source(File::new(path_str, FileFormat::Toml).required(required)))
}
