//! Action executor
//!
//! Issues one state-changing request and hands back either the resulting
//! resource or a handle to the asynchronous event it started.
//!
//! Create-then-deploy is not atomic: a created environment is
//! never rolled back when its deployment fails. The error says so.

use crate::api::{
    Component, CreateEnvironmentRequest, Environment, Event, EventHandle, PlatformApi,
};
use crate::context::ResourcePath;
use crate::error::{CommandError, RemoteError};
use serde::Serialize;
use tracing::{info, warn};

mod source;

pub use source::{
    violation_subject, CreateSource, FROM_GIT, FROM_GIT_REPO, FROM_PATH, FROM_TEMPLATE,
    GENERIC_SUBJECT,
};

/// Parameters for creating an environment.
#[derive(Debug, Clone, Default)]
pub struct CreateEnvironment {
    pub name: String,
    pub project: String,
    pub source: CreateSource,
    pub kubernetes_integration: Option<String>,
}

impl CreateEnvironment {
    /// Flag-level checks that need no network access.
    pub fn validate(&self, with_deploy: bool) -> Result<(), CommandError> {
        if self.name.trim().is_empty() {
            return Err(CommandError::InvalidArgument(
                "environment name must not be empty".to_string(),
            ));
        }
        self.source.validate()?;
        if with_deploy
            && self
                .kubernetes_integration
                .as_deref()
                .map_or(true, str::is_empty)
        {
            return Err(CommandError::InvalidArgument(
                "kubernetes integration must be provided when deploying".to_string(),
            ));
        }
        Ok(())
    }
}

/// A single state-changing request.
#[derive(Debug, Clone)]
pub enum Action {
    CreateEnvironment(CreateEnvironment),
    DeployEnvironment { environment: String },
    StartEnvironment { environment: String },
    StopEnvironment { environment: String },
    DeleteEnvironment { environment: String },
    StartRemoteDevelopment { component: String, resource: ResourcePath },
    StopRemoteDevelopment { component: String, resource: ResourcePath },
}

impl Action {
    pub fn verb(&self) -> &'static str {
        match self {
            Action::CreateEnvironment(_) => "create",
            Action::DeployEnvironment { .. } => "deploy",
            Action::StartEnvironment { .. } => "start",
            Action::StopEnvironment { .. } => "stop",
            Action::DeleteEnvironment { .. } => "delete",
            Action::StartRemoteDevelopment { .. } => "up",
            Action::StopRemoteDevelopment { .. } => "down",
        }
    }
}

/// What an action produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ActionOutcome {
    Environment(Environment),
    Component(Component),
    Event(EventHandle),
}

/// Result of a successful create-then-deploy chain.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedAndDeployed {
    pub environment: Environment,
    pub event: EventHandle,
}

pub struct ActionExecutor<'a> {
    api: &'a dyn PlatformApi,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(api: &'a dyn PlatformApi) -> Self {
        Self { api }
    }

    pub async fn execute(&self, action: Action) -> Result<ActionOutcome, CommandError> {
        info!(verb = action.verb(), "executing action");
        match action {
            Action::CreateEnvironment(request) => self
                .create_environment(request)
                .await
                .map(ActionOutcome::Environment),
            Action::DeployEnvironment { environment } => self
                .event(self.api.deploy_environment(&environment).await)
                .map(ActionOutcome::Event),
            Action::StartEnvironment { environment } => self
                .event(self.api.start_environment(&environment).await)
                .map(ActionOutcome::Event),
            Action::StopEnvironment { environment } => self
                .event(self.api.stop_environment(&environment).await)
                .map(ActionOutcome::Event),
            Action::DeleteEnvironment { environment } => self
                .event(self.api.delete_environment(&environment).await)
                .map(ActionOutcome::Event),
            Action::StartRemoteDevelopment {
                component,
                resource,
            } => self
                .api
                .start_remote_development(&component, &resource)
                .await
                .map(ActionOutcome::Component)
                .map_err(|e| rejection(e, GENERIC_SUBJECT)),
            Action::StopRemoteDevelopment {
                component,
                resource,
            } => self
                .api
                .stop_remote_development(&component, &resource)
                .await
                .map(ActionOutcome::Component)
                .map_err(|e| rejection(e, GENERIC_SUBJECT)),
        }
    }

    pub async fn create_environment(
        &self,
        request: CreateEnvironment,
    ) -> Result<Environment, CommandError> {
        request.validate(false)?;
        let genesis = request.source.into_genesis()?;
        let subject = violation_subject(&genesis);
        let body = CreateEnvironmentRequest {
            name: request.name,
            project: request.project,
            genesis,
            kubernetes_integration: request.kubernetes_integration.filter(|k| !k.is_empty()),
        };
        let environment = self
            .api
            .create_environment(&body)
            .await
            .map_err(|e| rejection(e, subject))?;
        info!(environment = %environment.id, "environment created");
        Ok(environment)
    }

    pub async fn deploy_environment(&self, environment: &str) -> Result<EventHandle, CommandError> {
        self.event(self.api.deploy_environment(environment).await)
    }

    /// Create, then deploy. Deploy is only attempted after a successful create;
    /// a failed deploy leaves the new environment in place and reports its id.
    pub async fn create_and_deploy(
        &self,
        request: CreateEnvironment,
    ) -> Result<CreatedAndDeployed, CommandError> {
        request.validate(true)?;
        let environment = self.create_environment(request).await?;

        match self.deploy_environment(&environment.id).await {
            Ok(event) => Ok(CreatedAndDeployed { environment, event }),
            Err(source) => {
                warn!(environment = %environment.id, error = %source, "deploy after create failed");
                Err(CommandError::DeployAfterCreate {
                    environment_id: environment.id,
                    source: Box::new(source),
                })
            }
        }
    }

    fn event(&self, result: Result<Event, RemoteError>) -> Result<EventHandle, CommandError> {
        result
            .map(|event| EventHandle::from(&event))
            .map_err(|e| rejection(e, GENERIC_SUBJECT))
    }
}

/// Violations become `ValidationFailed`; everything else stays a plain remote error.
fn rejection(error: RemoteError, subject: &str) -> CommandError {
    if error.violations().is_empty() {
        CommandError::Remote(error)
    } else {
        CommandError::ValidationFailed {
            subject: subject.to_string(),
            violations: error.violations().to_vec(),
        }
    }
}
