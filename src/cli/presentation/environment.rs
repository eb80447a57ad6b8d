//! Environment presentation: lists, details, creation and endpoints.

use super::shared::{fields, heading, or_dash, table};
use crate::api::{ComponentEndpoint, Environment, EventHandle};
use serde::Serialize;

pub fn format_environments_text(environments: &[Environment]) -> String {
    if environments.is_empty() {
        return "No environments found.".to_string();
    }
    let mut table = table(&["ID", "Name", "Type", "Operation", "Cluster"]);
    for env in environments {
        table.add_row(vec![
            env.id.clone(),
            env.name.clone(),
            or_dash(env.environment_type.as_deref()).to_string(),
            or_dash(env.operation_status.as_deref()).to_string(),
            or_dash(env.cluster_status.as_deref()).to_string(),
        ]);
    }
    format!("{}\n\n{}\n\nTotal: {}", heading("Environments"), table, environments.len())
}

pub fn format_environment_text(env: &Environment) -> String {
    fields(&[
        ("ID", &env.id),
        ("Name", &env.name),
        ("Project", &env.project),
        ("Organization", or_dash(env.organization.as_deref())),
        ("Type", or_dash(env.environment_type.as_deref())),
        ("Operation", or_dash(env.operation_status.as_deref())),
        ("Cluster", or_dash(env.cluster_status.as_deref())),
    ])
}

pub fn format_endpoints_text(endpoints: &[ComponentEndpoint]) -> String {
    if endpoints.is_empty() {
        return "No public endpoints.".to_string();
    }
    let mut table = table(&["Component", "Name", "URL"]);
    for endpoint in endpoints {
        if endpoint.hosts.is_empty() {
            table.add_row(vec![endpoint.component.clone(), endpoint.name.clone(), "-".into()]);
        }
        for host in &endpoint.hosts {
            table.add_row(vec![
                endpoint.component.clone(),
                endpoint.name.clone(),
                host_url(host),
            ]);
        }
    }
    format!("{}\n\n{}", heading("Endpoints"), table)
}

fn host_url(host: &str) -> String {
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

/// Line printed after an event was started.
pub fn format_event_started_text(verb: &str, environment: &str, event: &EventHandle) -> String {
    format!(
        "{} of environment {} started (event {}, status {})",
        capitalize(verb),
        environment,
        event.id,
        event.status.as_str()
    )
}

/// JSON shape for a create-then-deploy run.
#[derive(Debug, Serialize)]
pub struct CreateReport<'a> {
    pub environment: &'a Environment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<&'a EventHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<&'a [ComponentEndpoint]>,
}

pub fn format_create_report_text(report: &CreateReport<'_>) -> String {
    let mut out = format!(
        "Environment {} ({}) successfully created.\n\n{}",
        report.environment.name,
        report.environment.id,
        format_environment_text(report.environment)
    );
    if let Some(event) = report.event {
        out.push_str(&format!("\n\nDeploy event: {} ({})", event.id, event.status.as_str()));
    }
    if let Some(endpoints) = report.endpoints {
        out.push_str("\n\n");
        out.push_str(&format_endpoints_text(endpoints));
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
