//! Event presentation: lists, details, live step transitions and outcomes.

use super::shared::{fields, heading, or_dash, table};
use crate::api::{Event, EventStatus, StepStatus};
use crate::pipeline::{PipelineOutcome, StepTransition};
use owo_colors::OwoColorize;

pub fn format_events_text(events: &[Event]) -> String {
    if events.is_empty() {
        return "No events found.".to_string();
    }
    let mut table = table(&["ID", "Type", "Status", "Environment", "Created"]);
    for event in events {
        table.add_row(vec![
            event.id.clone(),
            event.event_type.clone(),
            event.status.as_str().to_string(),
            or_dash(event.environment.as_deref()).to_string(),
            event
                .created_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    format!("{}\n\n{}\n\nTotal: {}", heading("Events"), table, events.len())
}

pub fn format_event_text(event: &Event) -> String {
    let created = event.created_at.map(|t| t.to_rfc3339());
    let updated = event.updated_at.map(|t| t.to_rfc3339());
    let mut out = fields(&[
        ("ID", &event.id),
        ("Type", &event.event_type),
        ("Status", event.status.as_str()),
        ("Environment", or_dash(event.environment.as_deref())),
        ("Created", or_dash(created.as_deref())),
        ("Updated", or_dash(updated.as_deref())),
    ]);
    if !event.steps.is_empty() {
        let mut table = table(&["#", "Step", "Status", "Error"]);
        for (index, step) in event.steps.iter().enumerate() {
            table.add_row(vec![
                (index + 1).to_string(),
                step.name.clone(),
                step.status.as_str().to_string(),
                or_dash(step.error.as_deref()).to_string(),
            ]);
        }
        out.push_str(&format!("\n\n{}", table));
    }
    out
}

/// One progress line per step transition, printed to stderr while watching.
pub fn format_step_transition(transition: &StepTransition, color: bool) -> String {
    let status = transition.status.as_str();
    let status = if color {
        match transition.status {
            StepStatus::Succeeded => status.green().to_string(),
            StepStatus::Failed => status.red().to_string(),
            StepStatus::Canceled | StepStatus::Skipped => status.yellow().to_string(),
            StepStatus::Pending | StepStatus::Running => status.cyan().to_string(),
        }
    } else {
        status.to_string()
    };
    let mut line = format!("[{}] {}: {}", transition.index + 1, transition.name, status);
    if let Some(error) = &transition.error {
        line.push_str(&format!(" ({})", error));
    }
    line
}

pub fn format_outcome_text(outcome: &PipelineOutcome) -> String {
    let event = outcome.event();
    match outcome {
        PipelineOutcome::Succeeded { .. } => format!(
            "Pipeline for event {} ({}) succeeded with {} step(s).",
            event.id,
            event.event_type,
            event.steps.len()
        ),
        PipelineOutcome::Failed { step, error, .. } => {
            let mut line = format!("Pipeline for event {} failed", event.id);
            if let Some(step) = step {
                line.push_str(&format!(" at step '{}'", step));
            }
            if let Some(error) = error {
                line.push_str(&format!(": {}", error));
            }
            line
        }
        PipelineOutcome::Canceled { .. } => format!(
            "Pipeline for event {} was {}.",
            event.id,
            EventStatus::Canceled.as_str()
        ),
    }
}
