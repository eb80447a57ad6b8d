//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, requires_api};
pub use output::map_error;
pub use parse::{
    Cli, Commands, ComponentCommands, ConfigureCommands, ContextArgs, CreateArgs,
    EnvironmentCommands, EventCommands, OrganizationCommands, OutputFormat, ProfileCommands,
    ProjectCommands, RemoteDevelopmentCommands,
};
pub use presentation::{
    format_create_report_text, format_endpoints_text, format_environment_text,
    format_environments_text, format_event_text, format_events_text, format_outcome_text,
    format_step_transition, mask_token,
};
pub use route::RunContext;
