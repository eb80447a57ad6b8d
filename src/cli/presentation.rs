//! CLI presentation: text and json formatters per command family.

mod environment;
mod event;
mod hierarchy;
mod profile;
mod shared;

pub use environment::{
    format_create_report_text, format_endpoints_text, format_environment_text,
    format_environments_text, format_event_started_text, CreateReport,
};
pub use event::{
    format_event_text, format_events_text, format_outcome_text, format_step_transition,
};
pub use hierarchy::{
    format_component_text, format_components_text, format_organization_text,
    format_organizations_text, format_project_text, format_projects_text,
};
pub use profile::{format_profiles_text, mask_token, profile_views, ProfileView};
pub use shared::to_json;
