//! Error types for the Bunnyshell CLI.
//!
//! `RemoteError` is what the platform API hands back; `CommandError` is the
//! taxonomy every command surfaces to the top level.

use crate::api::Violation;
use crate::context::Level;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by the remote API collaborator.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Request rejected with status {status}: {message}")]
    Rejected {
        status: u16,
        message: String,
        violations: Vec<Violation>,
    },

    #[error("Connection error: {0}")]
    Transport(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Transport(_) | RemoteError::Timeout(_) => true,
            RemoteError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            RemoteError::Rejected { violations, .. } => violations,
            _ => &[],
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RemoteError::Timeout(error.to_string())
        } else if error.is_decode() {
            RemoteError::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            RemoteError::Rejected {
                status: status.as_u16(),
                message: error.to_string(),
                violations: Vec::new(),
            }
        } else {
            RemoteError::Transport(error.to_string())
        }
    }
}

/// Top-level command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{level} '{id}' not found")]
    NotFound { level: Level, id: String },

    #[error("Unable to determine the {level}: pass --{level} or run interactively")]
    SelectionRequired { level: Level },

    #[error("Selection of {level} aborted")]
    SelectionAborted { level: Level },

    #[error("No {level} available to select")]
    NoCandidates { level: Level },

    #[error("{level} '{id}' does not belong to {parent} '{expected}'")]
    ContextMismatch {
        level: Level,
        id: String,
        parent: Level,
        expected: String,
    },

    #[error("Failed to resolve {level}: {source}")]
    Lookup {
        level: Level,
        #[source]
        source: RemoteError,
    },

    #[error("Exactly one creation source must be provided ({0})")]
    AmbiguousSource(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation failed for {subject}")]
    ValidationFailed {
        subject: String,
        violations: Vec<Violation>,
    },

    #[error("Environment {environment_id} was created but deploying it failed: {source}")]
    DeployAfterCreate {
        environment_id: String,
        #[source]
        source: Box<CommandError>,
    },

    #[error("Pipeline for event {event_id} {status}{}", step_suffix(.step))]
    PipelineFailed {
        event_id: String,
        status: String,
        step: Option<String>,
        message: Option<String>,
    },

    #[error("Timed out after {waited:?} waiting for event {event_id}")]
    WatchTimedOut { event_id: String, waited: Duration },

    #[error("Event {event_id} unreachable after {attempts} attempts: {last_error}")]
    WatchUnreachable {
        event_id: String,
        attempts: usize,
        last_error: RemoteError,
    },

    #[error("Stopped watching event {event_id}")]
    WatchAborted { event_id: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Generic(String),
}

fn step_suffix(step: &Option<String>) -> String {
    step.as_ref()
        .map(|s| format!(" at step '{}'", s))
        .unwrap_or_default()
}

impl CommandError {
    /// Hierarchy level a resolver failure refers to, if any.
    pub fn level(&self) -> Option<Level> {
        match self {
            CommandError::NotFound { level, .. }
            | CommandError::SelectionRequired { level }
            | CommandError::SelectionAborted { level }
            | CommandError::NoCandidates { level }
            | CommandError::ContextMismatch { level, .. }
            | CommandError::Lookup { level, .. } => Some(*level),
            _ => None,
        }
    }

    /// Whether a resource was left behind by a partially completed chain.
    pub fn created_resource(&self) -> Option<&str> {
        match self {
            CommandError::DeployAfterCreate { environment_id, .. } => Some(environment_id),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for CommandError {
    fn from(err: config::ConfigError) -> Self {
        CommandError::Config(err.to_string())
    }
}
