//! Pipeline watcher
//!
//! Polls an event until it reaches a terminal status (`succeeded`, `failed`,
//! `canceled`), the wait budget runs out, or the caller cancels. Each step
//! transition is reported exactly once. Transient polling errors are retried
//! with exponential backoff; exhausting the retries is `WatchUnreachable`,
//! which is never confused with a pipeline that reports `failed`.

use crate::api::{Event, EventStatus, PlatformApi};
use crate::error::CommandError;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

mod cancel;
mod steps;

pub use cancel::CancelToken;
pub use steps::{StepTracker, StepTransition};

/// Polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    pub poll_interval: Duration,
    pub timeout: Duration,
    /// Retries per poll for transient errors.
    pub max_retries: usize,
    /// Delay before the first retry; doubles for each subsequent one.
    pub retry_backoff: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(30 * 60),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Terminal projection of an event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Succeeded {
        event: Event,
    },
    Failed {
        event: Event,
        step: Option<String>,
        error: Option<String>,
    },
    Canceled {
        event: Event,
    },
}

impl PipelineOutcome {
    fn from_terminal(event: Event) -> Self {
        match event.status {
            EventStatus::Succeeded => PipelineOutcome::Succeeded { event },
            EventStatus::Canceled => PipelineOutcome::Canceled { event },
            _ => {
                let (step, error) = event
                    .failed_step()
                    .map(|s| (Some(s.name.clone()), s.error.clone()))
                    .unwrap_or((None, None));
                PipelineOutcome::Failed { event, step, error }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Succeeded { .. })
    }

    pub fn event(&self) -> &Event {
        match self {
            PipelineOutcome::Succeeded { event }
            | PipelineOutcome::Failed { event, .. }
            | PipelineOutcome::Canceled { event } => event,
        }
    }

    /// The final event on success, `PipelineFailed` otherwise.
    pub fn into_result(self) -> Result<Event, CommandError> {
        match self {
            PipelineOutcome::Succeeded { event } => Ok(event),
            PipelineOutcome::Failed { event, step, error } => Err(CommandError::PipelineFailed {
                event_id: event.id,
                status: EventStatus::Failed.as_str().to_string(),
                step,
                message: error,
            }),
            PipelineOutcome::Canceled { event } => Err(CommandError::PipelineFailed {
                event_id: event.id,
                status: EventStatus::Canceled.as_str().to_string(),
                step: None,
                message: None,
            }),
        }
    }
}

pub struct PipelineWatcher<'a> {
    api: &'a dyn PlatformApi,
    config: WatchConfig,
}

impl<'a> PipelineWatcher<'a> {
    pub fn new(api: &'a dyn PlatformApi, config: WatchConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Watch `event_id` until it settles, reporting step transitions to `on_step`.
    pub async fn watch<F>(
        &self,
        event_id: &str,
        cancel: &CancelToken,
        mut on_step: F,
    ) -> Result<PipelineOutcome, CommandError>
    where
        F: FnMut(&StepTransition),
    {
        let started = Instant::now();
        let mut tracker = StepTracker::new();
        let mut polls = 0usize;

        loop {
            if cancel.is_cancelled() {
                return Err(aborted(event_id));
            }

            let event = self.poll(event_id, cancel).await?;
            polls += 1;
            debug!(event = %event_id, status = event.status.as_str(), polls, "polled event");

            for transition in tracker.observe(&event.steps) {
                on_step(&transition);
            }

            if event.status.is_terminal() {
                info!(event = %event_id, status = event.status.as_str(), polls, "pipeline finished");
                return Ok(PipelineOutcome::from_terminal(event));
            }

            let elapsed = started.elapsed();
            if elapsed >= self.config.timeout {
                warn!(event = %event_id, ?elapsed, "pipeline watch timed out");
                return Err(CommandError::WatchTimedOut {
                    event_id: event_id.to_string(),
                    waited: elapsed,
                });
            }

            let wait = self.config.poll_interval.min(self.config.timeout - elapsed);
            if cancel.sleep(wait).await {
                return Err(aborted(event_id));
            }
        }
    }

    /// One poll, retrying transient failures.
    async fn poll(&self, event_id: &str, cancel: &CancelToken) -> Result<Event, CommandError> {
        let mut attempts = 0usize;
        loop {
            attempts += 1;
            match self.api.get_event(event_id).await {
                Ok(event) => return Ok(event),
                Err(error) if error.is_transient() => {
                    if attempts > self.config.max_retries {
                        return Err(CommandError::WatchUnreachable {
                            event_id: event_id.to_string(),
                            attempts,
                            last_error: error,
                        });
                    }
                    let delay = backoff(self.config.retry_backoff, attempts);
                    warn!(event = %event_id, attempts, ?delay, %error, "retrying event poll");
                    if cancel.sleep(delay).await {
                        return Err(aborted(event_id));
                    }
                }
                Err(error) => return Err(CommandError::Remote(error)),
            }
        }
    }
}

/// Exponential backoff: base, 2×base, 4×base, …
fn backoff(base: Duration, attempt: usize) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16) as u32;
    base.saturating_mul(2u32.saturating_pow(exponent))
}

fn aborted(event_id: &str) -> CommandError {
    CommandError::WatchAborted {
        event_id: event_id.to_string(),
    }
}
