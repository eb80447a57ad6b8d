//! XDG-style locations for the config file and the log file.

use directories::BaseDirs;
use std::path::PathBuf;

const APP_DIR: &str = "bunnyshell";

fn env_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// `$XDG_CONFIG_HOME`, falling back to the platform config directory.
pub fn config_home() -> Option<PathBuf> {
    env_dir("XDG_CONFIG_HOME").or_else(|| BaseDirs::new().map(|b| b.config_dir().to_path_buf()))
}

/// `$XDG_DATA_HOME`, falling back to the platform local data directory.
pub fn data_home() -> Option<PathBuf> {
    env_dir("XDG_DATA_HOME")
        .or_else(|| BaseDirs::new().map(|b| b.data_local_dir().to_path_buf()))
}

/// Default config file: `<config_home>/bunnyshell/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    config_home().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Default log file: `<data_home>/bunnyshell/bns.log`.
pub fn default_log_path() -> Option<PathBuf> {
    data_home().map(|dir| dir.join(APP_DIR).join("bns.log"))
}
