//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::api::Violation;
use crate::error::CommandError;

/// Map a command error to the text printed on stderr.
///
/// Remote validation violations print one per line, followed by a single
/// generic failure line. Everything else is one descriptive line.
pub fn map_error(e: &CommandError) -> String {
    match e {
        CommandError::ValidationFailed {
            subject,
            violations,
        } => {
            let mut lines: Vec<String> = violations
                .iter()
                .map(|v| violation_line(subject, v))
                .collect();
            lines.push(format!("{}", e));
            lines.join("\n")
        }
        CommandError::DeployAfterCreate { source, .. } => {
            let inner = map_error(source);
            match inner.rsplit_once('\n') {
                Some((details, _)) => format!("{}\n{}", details, e),
                None => e.to_string(),
            }
        }
        CommandError::Remote(remote) if !remote.violations().is_empty() => {
            let mut lines: Vec<String> = remote
                .violations()
                .iter()
                .map(|v| violation_line("arguments", v))
                .collect();
            lines.push(e.to_string());
            lines.join("\n")
        }
        _ => e.to_string(),
    }
}

fn violation_line(subject: &str, violation: &Violation) -> String {
    match &violation.property_path {
        Some(path) if !path.is_empty() => {
            format!("Problem with {} ({}): {}", subject, path, violation.message)
        }
        _ => format!("Problem with {}: {}", subject, violation.message),
    }
}
