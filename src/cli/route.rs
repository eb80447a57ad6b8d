//! CLI route: single route table and run context. Dispatches to the resolver,
//! executor and pipeline watcher, then to presentation.

use crate::api::{EventHandle, HttpPlatformClient, PlatformApi};
use crate::cli::help::{command_name, requires_api};
use crate::cli::parse::{
    Cli, Commands, ComponentCommands, ConfigureCommands, ContextArgs, CreateArgs,
    EnvironmentCommands, EventCommands, OrganizationCommands, OutputFormat, ProfileCommands,
    ProjectCommands, RemoteDevelopmentCommands,
};
use crate::cli::presentation::{
    format_component_text, format_components_text, format_create_report_text,
    format_endpoints_text, format_environment_text, format_environments_text,
    format_event_started_text, format_event_text, format_events_text, format_organization_text,
    format_organizations_text, format_outcome_text, format_profiles_text, format_project_text,
    format_projects_text, format_step_transition, profile_views, to_json, CreateReport,
};
use crate::config::{BnsConfig, ConfigLoader, Profile, ValidationError};
use crate::context::{Context, Level, ResourcePath};
use crate::error::CommandError;
use crate::executor::{Action, ActionExecutor, ActionOutcome, CreateEnvironment};
use crate::pipeline::{CancelToken, PipelineOutcome, PipelineWatcher};
use crate::resolver::{for_session, ResolvedChain, Resolver};
use serde::Serialize;
use std::future::Future;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runtime context for one CLI invocation: loaded config, selected profile,
/// default context and the platform client.
pub struct RunContext {
    config: BnsConfig,
    config_path: PathBuf,
    profile: Option<String>,
    base_context: Context,
    api: Option<Arc<dyn PlatformApi>>,
    non_interactive: bool,
    output: OutputFormat,
    color: bool,
}

impl RunContext {
    /// Load config, pick the profile and build the API client when the
    /// command needs one.
    pub fn new(cli: &Cli) -> Result<Self, CommandError> {
        let config_path = ConfigLoader::resolve_path(cli.config_file.as_deref())?;
        let config = ConfigLoader::load(Some(&config_path))?;
        let needs_api = requires_api(&cli.command);

        let selected = config.profile(cli.profile.as_deref());
        if needs_api {
            if let (Some(name), None) = (cli.profile.as_deref(), selected) {
                return Err(CommandError::Config(format!(
                    "Profile '{}' is not defined in {}",
                    name,
                    config_path.display()
                )));
            }
            config.validate().map_err(validation_error)?;
        }

        let profile = selected.map(|(name, _)| name.to_string());
        let base_context = selected
            .map(|(_, profile)| profile.context())
            .unwrap_or_default();
        let token = cli
            .token
            .clone()
            .or_else(|| selected.map(|(_, profile)| profile.token.clone()))
            .filter(|token| !token.trim().is_empty());

        let api: Option<Arc<dyn PlatformApi>> = match (needs_api, token) {
            (false, _) => None,
            (true, Some(token)) => Some(Arc::new(HttpPlatformClient::new(
                config.api.client_settings(token),
            )?)),
            (true, None) => {
                return Err(CommandError::Config(
                    "No API token: pass --token or run 'bns configure profiles add'".to_string(),
                ))
            }
        };

        let color = config.logging.color
            && std::io::stderr().is_terminal()
            && std::env::var_os("NO_COLOR").is_none();

        debug!(config_path = %config_path.display(), profile = ?profile, "run context ready");
        Ok(Self {
            config,
            config_path,
            profile,
            base_context,
            api,
            non_interactive: cli.non_interactive,
            output: cli.output,
            color,
        })
    }

    /// Replace the platform client.
    pub fn with_api(mut self, api: Arc<dyn PlatformApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn config(&self) -> &BnsConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, CommandError> {
        let name = command_name(command);
        info!(command = %name, profile = ?self.profile, "executing command");
        let result = match command {
            Commands::Configure { command } => self.handle_configure(command),
            _ => self.block_on(self.execute_remote(command)).and_then(|r| r),
        };
        match &result {
            Ok(_) => info!(command = %name, "command succeeded"),
            Err(e) => warn!(command = %name, error = %e, "command failed"),
        }
        result
    }

    /// Drive `future` on a single-threaded runtime owned by this call.
    fn block_on<F: Future>(&self, future: F) -> Result<F::Output, CommandError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(CommandError::Generic(
                "Cannot run a command from within an async runtime".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(future))
    }

    fn api(&self) -> Result<&dyn PlatformApi, CommandError> {
        self.api
            .as_deref()
            .ok_or_else(|| CommandError::Config("No API client configured".to_string()))
    }

    fn render<T, F>(&self, value: &T, text: F) -> Result<String, CommandError>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        match self.output {
            OutputFormat::Json => to_json(value),
            OutputFormat::Text => Ok(text(value)),
        }
    }

    /// Progress lines go to stderr so stdout stays parseable.
    fn progress(&self, line: &str) {
        if self.output == OutputFormat::Text {
            eprintln!("{}", line);
        }
    }

    // --- configure ---

    fn handle_configure(&self, command: &ConfigureCommands) -> Result<String, CommandError> {
        let ConfigureCommands::Profiles { command } = command;
        match command {
            ProfileCommands::List => self.render(profile_views(&self.config).as_slice(), |views| {
                format_profiles_text(views)
            }),
            ProfileCommands::Add {
                name,
                token,
                default,
                context,
            } => {
                let context = context.context();
                let mut config = ConfigLoader::load_stored(&self.config_path)?;
                config.profiles.insert(
                    name.clone(),
                    Profile {
                        token: token.clone(),
                        organization: context.organization,
                        project: context.project,
                        environment: context.environment,
                        component: context.component,
                    },
                );
                if *default || config.default_profile.is_none() {
                    config.default_profile = Some(name.clone());
                }
                self.save(&config)?;
                Ok(format!(
                    "Profile '{}' saved to {}",
                    name,
                    self.config_path.display()
                ))
            }
            ProfileCommands::Remove { name } => {
                let mut config = ConfigLoader::load_stored(&self.config_path)?;
                if config.profiles.remove(name).is_none() {
                    return Err(unknown_profile(name));
                }
                if config.default_profile.as_deref() == Some(name.as_str()) {
                    config.default_profile = None;
                }
                self.save(&config)?;
                Ok(format!("Profile '{}' removed", name))
            }
            ProfileCommands::Default { name } => {
                let mut config = ConfigLoader::load_stored(&self.config_path)?;
                if !config.profiles.contains_key(name) {
                    return Err(unknown_profile(name));
                }
                config.default_profile = Some(name.clone());
                self.save(&config)?;
                Ok(format!("Default profile set to '{}'", name))
            }
        }
    }

    fn save(&self, config: &BnsConfig) -> Result<(), CommandError> {
        config.validate().map_err(validation_error)?;
        ConfigLoader::save(config, &self.config_path)
    }

    // --- remote commands ---

    async fn execute_remote(&self, command: &Commands) -> Result<String, CommandError> {
        match command {
            Commands::Configure { command } => self.handle_configure(command),
            Commands::Organizations { command } => self.handle_organizations(command).await,
            Commands::Projects { command } => self.handle_projects(command).await,
            Commands::Environments { command } => self.handle_environments(command).await,
            Commands::Components { command } => self.handle_components(command).await,
            Commands::Events { command } => self.handle_events(command).await,
            Commands::RemoteDevelopment { command } => {
                self.handle_remote_development(command).await
            }
        }
    }

    /// Flags (and their environment variables) over profile defaults.
    fn invocation_context(&self, args: &ContextArgs) -> Context {
        self.base_context.clone().overlay(&args.context())
    }

    async fn resolve(
        &self,
        args: &ContextArgs,
        target: Level,
    ) -> Result<ResolvedChain, CommandError> {
        self.resolve_context(self.invocation_context(args), target)
            .await
    }

    async fn resolve_context(
        &self,
        mut context: Context,
        target: Level,
    ) -> Result<ResolvedChain, CommandError> {
        let api = self.api()?;
        let mut selector = for_session(self.non_interactive);
        let chain = Resolver::new(api, selector.as_mut())
            .resolve(&mut context, target)
            .await?;
        debug!(?context, "context resolved");
        Ok(chain)
    }

    async fn resolved_id(&self, args: &ContextArgs, level: Level) -> Result<String, CommandError> {
        let chain = self.resolve(args, level).await?;
        Ok(chain.require(level)?.id.clone())
    }

    async fn handle_organizations(
        &self,
        command: &OrganizationCommands,
    ) -> Result<String, CommandError> {
        let api = self.api()?;
        match command {
            OrganizationCommands::List => {
                let organizations = api.list_organizations().await?;
                self.render(organizations.as_slice(), format_organizations_text)
            }
            OrganizationCommands::Show { context } => {
                let id = self.resolved_id(context, Level::Organization).await?;
                let organization = api.lookup_organization(&id).await?;
                self.render(&organization, format_organization_text)
            }
        }
    }

    async fn handle_projects(&self, command: &ProjectCommands) -> Result<String, CommandError> {
        let api = self.api()?;
        match command {
            ProjectCommands::List { context } => {
                let organization = self.resolved_id(context, Level::Organization).await?;
                let projects = api.list_projects(&organization).await?;
                self.render(projects.as_slice(), format_projects_text)
            }
            ProjectCommands::Show { context } => {
                let id = self.resolved_id(context, Level::Project).await?;
                let project = api.lookup_project(&id).await?;
                self.render(&project, format_project_text)
            }
        }
    }

    async fn handle_components(
        &self,
        command: &ComponentCommands,
    ) -> Result<String, CommandError> {
        let api = self.api()?;
        match command {
            ComponentCommands::List { context } => {
                let environment = self.resolved_id(context, Level::Environment).await?;
                let components = api.list_components(&environment).await?;
                self.render(components.as_slice(), format_components_text)
            }
            ComponentCommands::Show { context } => {
                let id = self.resolved_id(context, Level::Component).await?;
                let component = api.lookup_component(&id).await?;
                self.render(&component, format_component_text)
            }
        }
    }

    async fn handle_environments(
        &self,
        command: &EnvironmentCommands,
    ) -> Result<String, CommandError> {
        let api = self.api()?;
        match command {
            EnvironmentCommands::List { context } => {
                let project = self.resolved_id(context, Level::Project).await?;
                let environments = api.list_environments(&project).await?;
                self.render(environments.as_slice(), format_environments_text)
            }
            EnvironmentCommands::Show { context } => {
                let id = self.resolved_id(context, Level::Environment).await?;
                let environment = api.lookup_environment(&id).await?;
                self.render(&environment, format_environment_text)
            }
            EnvironmentCommands::Create(args) => self.create_environment(args).await,
            EnvironmentCommands::Deploy { context, no_wait } => {
                self.environment_action(context, *no_wait, |environment| {
                    Action::DeployEnvironment { environment }
                })
                .await
            }
            EnvironmentCommands::Start { context, no_wait } => {
                self.environment_action(context, *no_wait, |environment| {
                    Action::StartEnvironment { environment }
                })
                .await
            }
            EnvironmentCommands::Stop { context, no_wait } => {
                self.environment_action(context, *no_wait, |environment| {
                    Action::StopEnvironment { environment }
                })
                .await
            }
            EnvironmentCommands::Delete { context, no_wait } => {
                self.environment_action(context, *no_wait, |environment| {
                    Action::DeleteEnvironment { environment }
                })
                .await
            }
            EnvironmentCommands::Endpoints { context } => {
                let id = self.resolved_id(context, Level::Environment).await?;
                let endpoints = api.environment_endpoints(&id).await?;
                self.render(endpoints.as_slice(), format_endpoints_text)
            }
        }
    }

    async fn environment_action(
        &self,
        context: &ContextArgs,
        no_wait: bool,
        build: fn(String) -> Action,
    ) -> Result<String, CommandError> {
        let environment = self.resolved_id(context, Level::Environment).await?;
        let action = build(environment.clone());
        let verb = action.verb();

        let handle = match ActionExecutor::new(self.api()?).execute(action).await? {
            ActionOutcome::Event(handle) => handle,
            other => {
                return Err(CommandError::Generic(format!(
                    "{} returned no event: {:?}",
                    verb, other
                )))
            }
        };

        let started = format_event_started_text(verb, &environment, &handle);
        if no_wait {
            return self.render(&handle, |_| started.clone());
        }
        self.progress(&started);
        let outcome = self.follow(&handle).await?;
        self.render(&outcome, format_outcome_text)
    }

    async fn create_environment(&self, args: &CreateArgs) -> Result<String, CommandError> {
        let mut request = CreateEnvironment {
            name: args.name.clone(),
            project: String::new(),
            source: args.source(),
            kubernetes_integration: args.k8s.clone(),
        };
        // Flag problems surface before any prompt or request.
        request.validate(args.deploy)?;
        request.project = self.resolved_id(&args.context, Level::Project).await?;

        let api = self.api()?;
        let executor = ActionExecutor::new(api);
        if !args.deploy {
            let environment = executor.create_environment(request).await?;
            let report = CreateReport {
                environment: &environment,
                event: None,
                endpoints: None,
            };
            return self.render(&report, format_create_report_text);
        }

        let created = executor.create_and_deploy(request).await?;
        let environment_id = created.environment.id.clone();
        self.progress(&format!(
            "Environment {} successfully created... deploying... (event {})",
            environment_id, created.event.id
        ));
        if args.no_wait {
            let report = CreateReport {
                environment: &created.environment,
                event: Some(&created.event),
                endpoints: None,
            };
            return self.render(&report, format_create_report_text);
        }

        self.follow(&created.event)
            .await
            .map_err(|source| CommandError::DeployAfterCreate {
                environment_id: environment_id.clone(),
                source: Box::new(source),
            })?;

        let endpoints = match api.environment_endpoints(&environment_id).await {
            Ok(endpoints) => Some(endpoints),
            Err(error) => {
                warn!(environment = %environment_id, %error, "could not fetch endpoints");
                None
            }
        };
        let report = CreateReport {
            environment: &created.environment,
            event: Some(&created.event),
            endpoints: endpoints.as_deref(),
        };
        self.render(&report, format_create_report_text)
    }

    async fn handle_events(&self, command: &EventCommands) -> Result<String, CommandError> {
        let api = self.api()?;
        match command {
            EventCommands::List { environment } => {
                let environment = environment
                    .clone()
                    .or_else(|| self.base_context.environment.clone());
                let events = api.list_events(environment.as_deref()).await?;
                self.render(events.as_slice(), format_events_text)
            }
            EventCommands::Show { id } => {
                let event = api.get_event(id).await?;
                self.render(&event, format_event_text)
            }
            EventCommands::Watch { id } => {
                let event = api.get_event(id).await?;
                let outcome = self.follow(&EventHandle::from(&event)).await?;
                self.render(&outcome, format_outcome_text)
            }
        }
    }

    /// Watch an event to the end, printing step transitions. Ctrl-C stops
    /// the watch with `WatchAborted`; a failed or canceled pipeline is an error.
    async fn follow(&self, handle: &EventHandle) -> Result<PipelineOutcome, CommandError> {
        let cancel = CancelToken::new();
        cancel.cancel_on_interrupt();

        let watcher = PipelineWatcher::new(self.api()?, self.config.pipeline.watch_config());
        let color = self.color;
        let outcome = watcher
            .watch(&handle.id, &cancel, |transition| {
                self.progress(&format_step_transition(transition, color))
            })
            .await?;
        outcome.clone().into_result()?;
        Ok(outcome)
    }

    async fn handle_remote_development(
        &self,
        command: &RemoteDevelopmentCommands,
    ) -> Result<String, CommandError> {
        let (context, resource, starting) = match command {
            RemoteDevelopmentCommands::Up { context, resource } => (context, resource, true),
            RemoteDevelopmentCommands::Down { context, resource } => (context, resource, false),
        };

        let mut invocation = self.invocation_context(context);
        invocation.resource = resource.clone();
        let chain = self.resolve_context(invocation, Level::Resource).await?;
        let component = chain.require(Level::Component)?.id.clone();
        let resource: ResourcePath = chain
            .resource
            .clone()
            .ok_or(CommandError::SelectionRequired {
                level: Level::Resource,
            })?;

        let action = if starting {
            Action::StartRemoteDevelopment {
                component,
                resource: resource.clone(),
            }
        } else {
            Action::StopRemoteDevelopment {
                component,
                resource: resource.clone(),
            }
        };
        let verb = if starting { "started" } else { "stopped" };

        match ActionExecutor::new(self.api()?).execute(action).await? {
            ActionOutcome::Component(component) => self.render(&component, |component| {
                format!(
                    "Remote development {} for {} on {}\n\n{}",
                    verb,
                    component.name,
                    resource,
                    format_component_text(component)
                )
            }),
            other => self.render(&other, |_| format!("Remote development {}", verb)),
        }
    }
}

fn validation_error(errors: Vec<ValidationError>) -> CommandError {
    let details: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    CommandError::Config(format!("Invalid configuration: {}", details.join("; ")))
}

fn unknown_profile(name: &str) -> CommandError {
    CommandError::Config(format!("Profile '{}' is not defined", name))
}
