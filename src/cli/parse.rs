//! CLI parse: clap types for bns. No behavior; definitions only.

use crate::context::{Context, ResourcePath};
use crate::executor::CreateSource;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// bns - Bunnyshell environments from the command line
#[derive(Parser, Debug)]
#[command(name = "bns", version)]
#[command(about = "Create, deploy and inspect Bunnyshell environments")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Profile to use (defaults to the configured default profile)
    #[arg(long, global = true, env = "BNS_PROFILE")]
    pub profile: Option<String>,

    /// Configuration file path (overrides the default location)
    #[arg(long, global = true, env = "BNS_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// API token (overrides the profile token)
    #[arg(long, global = true, env = "BNS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Never prompt; fail when a value has to be selected
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Enable verbose logging (debug level, mirrored to stderr)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Context selection flags shared by every command that talks to the platform.
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// Organization ID
    #[arg(long, env = "BNS_ORGANIZATION")]
    pub organization: Option<String>,

    /// Project ID
    #[arg(long, env = "BNS_PROJECT")]
    pub project: Option<String>,

    /// Environment ID
    #[arg(long, env = "BNS_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Component ID
    #[arg(long, env = "BNS_COMPONENT")]
    pub component: Option<String>,
}

impl ContextArgs {
    pub fn context(&self) -> Context {
        Context {
            organization: self.organization.clone(),
            project: self.project.clone(),
            environment: self.environment.clone(),
            component: self.component.clone(),
            resource: None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage local configuration
    Configure {
        #[command(subcommand)]
        command: ConfigureCommands,
    },
    /// Organizations
    Organizations {
        #[command(subcommand)]
        command: OrganizationCommands,
    },
    /// Projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Environments
    Environments {
        #[command(subcommand)]
        command: EnvironmentCommands,
    },
    /// Components
    Components {
        #[command(subcommand)]
        command: ComponentCommands,
    },
    /// Events and their pipelines
    Events {
        #[command(subcommand)]
        command: EventCommands,
    },
    /// Remote development sessions
    RemoteDevelopment {
        #[command(subcommand)]
        command: RemoteDevelopmentCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigureCommands {
    /// Manage profiles
    Profiles {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List profiles
    List,
    /// Add or replace a profile
    Add {
        /// Profile name
        #[arg(long)]
        name: String,
        /// API token
        #[arg(long)]
        token: String,
        /// Make this the default profile
        #[arg(long)]
        default: bool,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Remove a profile
    Remove {
        #[arg(long)]
        name: String,
    },
    /// Set the default profile
    Default {
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum OrganizationCommands {
    /// List organizations
    List,
    /// Show an organization
    Show {
        #[command(flatten)]
        context: ContextArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List projects of an organization
    List {
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Show a project
    Show {
        #[command(flatten)]
        context: ContextArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum EnvironmentCommands {
    /// List environments of a project
    List {
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Show an environment
    Show {
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Create an environment, optionally deploying it
    Create(CreateArgs),
    /// Deploy an environment
    Deploy {
        #[command(flatten)]
        context: ContextArgs,
        /// Return the event without waiting for the pipeline
        #[arg(long)]
        no_wait: bool,
    },
    /// Start an environment
    Start {
        #[command(flatten)]
        context: ContextArgs,
        #[arg(long)]
        no_wait: bool,
    },
    /// Stop an environment
    Stop {
        #[command(flatten)]
        context: ContextArgs,
        #[arg(long)]
        no_wait: bool,
    },
    /// Delete an environment
    Delete {
        #[command(flatten)]
        context: ContextArgs,
        #[arg(long)]
        no_wait: bool,
    },
    /// Show public endpoints of an environment
    Endpoints {
        #[command(flatten)]
        context: ContextArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    #[command(flatten)]
    pub context: ContextArgs,

    /// Environment name
    #[arg(long)]
    pub name: String,

    /// Environment definition URL inside a git repository
    #[arg(long = "from-git")]
    pub from_git: Option<String>,

    /// Template ID
    #[arg(long = "from-template")]
    pub from_template: Option<String>,

    /// Local environment definition file
    #[arg(long = "from-path")]
    pub from_path: Option<PathBuf>,

    /// Git repository URL
    #[arg(long = "from-git-repo")]
    pub from_git_repo: Option<String>,

    /// Branch to use with --from-git-repo
    #[arg(long = "from-git-branch")]
    pub from_git_branch: Option<String>,

    /// Definition path inside --from-git-repo
    #[arg(long = "from-git-path")]
    pub from_git_path: Option<String>,

    /// Kubernetes integration ID (required with --deploy)
    #[arg(long = "k8s")]
    pub k8s: Option<String>,

    /// Deploy the environment after creation
    #[arg(long)]
    pub deploy: bool,

    /// With --deploy, return without waiting for the pipeline
    #[arg(long)]
    pub no_wait: bool,
}

impl CreateArgs {
    pub fn source(&self) -> CreateSource {
        CreateSource {
            git_spec: self.from_git.clone(),
            template: self.from_template.clone(),
            yaml_path: self.from_path.clone(),
            git_repo: self.from_git_repo.clone(),
            git_branch: self.from_git_branch.clone(),
            git_path: self.from_git_path.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ComponentCommands {
    /// List components of an environment
    List {
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Show a component
    Show {
        #[command(flatten)]
        context: ContextArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum EventCommands {
    /// List events, optionally for one environment
    List {
        /// Environment ID
        #[arg(long, env = "BNS_ENVIRONMENT")]
        environment: Option<String>,
    },
    /// Show an event and its steps
    Show {
        /// Event ID
        id: String,
    },
    /// Follow an event until its pipeline finishes
    Watch {
        /// Event ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RemoteDevelopmentCommands {
    /// Start a remote development session on a component
    Up {
        #[command(flatten)]
        context: ContextArgs,
        /// Kubernetes resource as namespace/kind/name
        #[arg(long)]
        resource: Option<ResourcePath>,
    },
    /// Stop a remote development session
    Down {
        #[command(flatten)]
        context: ContextArgs,
        /// Kubernetes resource as namespace/kind/name
        #[arg(long)]
        resource: Option<ResourcePath>,
    },
}
