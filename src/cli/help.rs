//! CLI command-name contract used in logs (e.g. "environments.create").

use crate::cli::parse::{
    Commands, ComponentCommands, ConfigureCommands, EnvironmentCommands, EventCommands,
    OrganizationCommands, ProfileCommands, ProjectCommands, RemoteDevelopmentCommands,
};

pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Configure { command } => format!("configure.{}", configure_command_name(command)),
        Commands::Organizations { command } => {
            format!("organizations.{}", organization_command_name(command))
        }
        Commands::Projects { command } => format!("projects.{}", project_command_name(command)),
        Commands::Environments { command } => {
            format!("environments.{}", environment_command_name(command))
        }
        Commands::Components { command } => {
            format!("components.{}", component_command_name(command))
        }
        Commands::Events { command } => format!("events.{}", event_command_name(command)),
        Commands::RemoteDevelopment { command } => {
            format!("remote-development.{}", remote_development_command_name(command))
        }
    }
}

pub fn configure_command_name(command: &ConfigureCommands) -> &'static str {
    match command {
        ConfigureCommands::Profiles { command } => match command {
            ProfileCommands::List => "profiles.list",
            ProfileCommands::Add { .. } => "profiles.add",
            ProfileCommands::Remove { .. } => "profiles.remove",
            ProfileCommands::Default { .. } => "profiles.default",
        },
    }
}

pub fn organization_command_name(command: &OrganizationCommands) -> &'static str {
    match command {
        OrganizationCommands::List => "list",
        OrganizationCommands::Show { .. } => "show",
    }
}

pub fn project_command_name(command: &ProjectCommands) -> &'static str {
    match command {
        ProjectCommands::List { .. } => "list",
        ProjectCommands::Show { .. } => "show",
    }
}

pub fn environment_command_name(command: &EnvironmentCommands) -> &'static str {
    match command {
        EnvironmentCommands::List { .. } => "list",
        EnvironmentCommands::Show { .. } => "show",
        EnvironmentCommands::Create(_) => "create",
        EnvironmentCommands::Deploy { .. } => "deploy",
        EnvironmentCommands::Start { .. } => "start",
        EnvironmentCommands::Stop { .. } => "stop",
        EnvironmentCommands::Delete { .. } => "delete",
        EnvironmentCommands::Endpoints { .. } => "endpoints",
    }
}

pub fn component_command_name(command: &ComponentCommands) -> &'static str {
    match command {
        ComponentCommands::List { .. } => "list",
        ComponentCommands::Show { .. } => "show",
    }
}

pub fn event_command_name(command: &EventCommands) -> &'static str {
    match command {
        EventCommands::List { .. } => "list",
        EventCommands::Show { .. } => "show",
        EventCommands::Watch { .. } => "watch",
    }
}

pub fn remote_development_command_name(command: &RemoteDevelopmentCommands) -> &'static str {
    match command {
        RemoteDevelopmentCommands::Up { .. } => "up",
        RemoteDevelopmentCommands::Down { .. } => "down",
    }
}

/// Whether the command needs an API token.
pub fn requires_api(command: &Commands) -> bool {
    !matches!(command, Commands::Configure { .. })
}
