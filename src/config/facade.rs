//! Config loading and saving.

use super::merge::builder_with_defaults;
use super::sources::{environment, profile_file};
use super::{paths, BnsConfig};
use crate::error::CommandError;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Default config file location, if a home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        paths::default_config_path()
    }

    /// The explicit path if given, otherwise the default location.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, CommandError> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path().ok_or_else(|| {
                CommandError::Config(
                    "Unable to determine the config directory; pass --config-file".to_string(),
                )
            }),
        }
    }

    /// Load defaults, then the config file (if present), then `BNS__*` variables.
    pub fn load(explicit: Option<&Path>) -> Result<BnsConfig, CommandError> {
        let path = Self::resolve_path(explicit)?;
        Self::build(&path, false)
    }

    /// Like [`load`](Self::load) but the file must exist.
    pub fn load_from_file(path: &Path) -> Result<BnsConfig, CommandError> {
        Self::build(path, true)
    }

    /// Defaults plus the config file, without `BNS__*` overrides. This is the
    /// state profile edits start from so that overrides never reach the file.
    pub fn load_stored(path: &Path) -> Result<BnsConfig, CommandError> {
        let builder = builder_with_defaults()?;
        let builder = profile_file::add_to_builder(builder, path, false)?;
        let config: BnsConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    fn build(path: &Path, required: bool) -> Result<BnsConfig, CommandError> {
        let builder = builder_with_defaults()?;
        let builder = profile_file::add_to_builder(builder, path, required)?;
        let builder = environment::add_to_builder(builder)?;
        let config: BnsConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Persist `config` to `path`, creating parent directories. The file holds
    /// API tokens, so on unix it is readable by the owner only.
    pub fn save(config: &BnsConfig, path: &Path) -> Result<(), CommandError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CommandError::Config(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let content = toml::to_string_pretty(config)
            .map_err(|e| CommandError::Config(format!("Failed to serialize config: {}", e)))?;
        write_private(path, content.as_bytes()).map_err(|e| {
            CommandError::Config(format!("Failed to write {}: {}", path.display(), e))
        })?;
        info!(config_path = %path.display(), "config saved");
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, content)
}
