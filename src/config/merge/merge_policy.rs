//! Merge rules: defaults first, then the profile file, then the environment.

use super::super::{
    DEFAULT_API_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_RETRIES,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_BACKOFF_MS,
    DEFAULT_WATCH_TIMEOUT_SECS,
};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("api.base_url", DEFAULT_API_BASE_URL)?
        .set_default("api.timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS as i64)?
        .set_default("api.connect_timeout_secs", DEFAULT_CONNECT_TIMEOUT_SECS as i64)?
        .set_default("pipeline.poll_interval_ms", DEFAULT_POLL_INTERVAL_MS as i64)?
        .set_default("pipeline.timeout_secs", DEFAULT_WATCH_TIMEOUT_SECS as i64)?
        .set_default("pipeline.max_retries", DEFAULT_MAX_RETRIES as i64)?
        .set_default("pipeline.retry_backoff_ms", DEFAULT_RETRY_BACKOFF_MS as i64)
}
