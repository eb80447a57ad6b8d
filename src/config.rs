//! Configuration System
//!
//! Profiles (API token plus default context), API connection settings,
//! pipeline polling settings and logging. Values come from built-in
//! defaults, the TOML config file and `BNS__*` environment variables, in
//! that order. The config file is the only state kept between invocations.

use crate::api::ClientSettings;
use crate::context::Context;
use crate::logging::LoggingConfig;
use crate::pipeline::WatchConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

mod facade;
mod merge;
mod paths;
mod sources;

pub use facade::ConfigLoader;
pub use sources::environment::{ENV_PREFIX, ENV_SEPARATOR};

/// XDG path helpers
pub mod xdg {
    pub use super::paths::*;
}

pub const DEFAULT_API_BASE_URL: &str = "https://api.environments.bunnyshell.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_WATCH_TIMEOUT_SECS: u64 = 30 * 60;
pub const DEFAULT_MAX_RETRIES: usize = 3;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BnsConfig {
    /// Profile used when none is named on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A named API token with its default context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

impl Profile {
    pub fn context(&self) -> Context {
        Context {
            organization: self.organization.clone(),
            project: self.project.clone(),
            environment: self.environment.clone(),
            component: self.component.clone(),
            resource: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn client_settings(&self, token: impl Into<String>) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            token: token.into(),
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_watch_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_watch_timeout() -> u64 {
    DEFAULT_WATCH_TIMEOUT_SECS
}

fn default_max_retries() -> usize {
    DEFAULT_MAX_RETRIES
}

fn default_retry_backoff() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            timeout_secs: default_watch_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

impl PipelineConfig {
    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Profile(String, String),
    Api(String),
    Pipeline(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Profile(name, msg) => write!(f, "Profile '{}': {}", name, msg),
            ValidationError::Api(msg) => write!(f, "API: {}", msg),
            ValidationError::Pipeline(msg) => write!(f, "Pipeline: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl BnsConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (name, profile) in &self.profiles {
            if profile.token.trim().is_empty() {
                errors.push(ValidationError::Profile(
                    name.clone(),
                    "token cannot be empty".to_string(),
                ));
            }
        }

        if let Some(default) = &self.default_profile {
            if !self.profiles.contains_key(default) {
                errors.push(ValidationError::Profile(
                    default.clone(),
                    "default profile is not defined".to_string(),
                ));
            }
        }

        if reqwest::Url::parse(&self.api.base_url).is_err() {
            errors.push(ValidationError::Api(format!(
                "invalid base_url '{}'",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            errors.push(ValidationError::Api("timeout_secs must be positive".to_string()));
        }

        if self.pipeline.poll_interval_ms == 0 {
            errors.push(ValidationError::Pipeline(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.pipeline.timeout_secs == 0 {
            errors.push(ValidationError::Pipeline(
                "timeout_secs must be positive".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The named profile, or the default one when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Option<(&str, &Profile)> {
        let name = name.or(self.default_profile.as_deref())?;
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
    }
}
