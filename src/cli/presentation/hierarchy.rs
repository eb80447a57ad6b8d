//! Organization, project and component presentation.

use super::shared::{fields, heading, or_dash, table};
use crate::api::{Component, Organization, Project};

pub fn format_organizations_text(organizations: &[Organization]) -> String {
    if organizations.is_empty() {
        return "No organizations found.".to_string();
    }
    let mut table = table(&["ID", "Name"]);
    for org in organizations {
        table.add_row(vec![org.id.clone(), org.name.clone()]);
    }
    format!("{}\n\n{}\n\nTotal: {}", heading("Organizations"), table, organizations.len())
}

pub fn format_organization_text(org: &Organization) -> String {
    fields(&[("ID", &org.id), ("Name", &org.name)])
}

pub fn format_projects_text(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects found.".to_string();
    }
    let mut table = table(&["ID", "Name", "Organization"]);
    for project in projects {
        table.add_row(vec![
            project.id.clone(),
            project.name.clone(),
            project.organization.clone(),
        ]);
    }
    format!("{}\n\n{}\n\nTotal: {}", heading("Projects"), table, projects.len())
}

pub fn format_project_text(project: &Project) -> String {
    fields(&[
        ("ID", &project.id),
        ("Name", &project.name),
        ("Organization", &project.organization),
    ])
}

pub fn format_components_text(components: &[Component]) -> String {
    if components.is_empty() {
        return "No components found.".to_string();
    }
    let mut table = table(&["ID", "Name", "Operation", "Cluster"]);
    for component in components {
        table.add_row(vec![
            component.id.clone(),
            component.name.clone(),
            or_dash(component.operation_status.as_deref()).to_string(),
            or_dash(component.cluster_status.as_deref()).to_string(),
        ]);
    }
    format!("{}\n\n{}\n\nTotal: {}", heading("Components"), table, components.len())
}

pub fn format_component_text(component: &Component) -> String {
    fields(&[
        ("ID", &component.id),
        ("Name", &component.name),
        ("Environment", &component.environment),
        ("Operation", or_dash(component.operation_status.as_deref())),
        ("Cluster", or_dash(component.cluster_status.as_deref())),
    ])
}
