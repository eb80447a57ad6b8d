//! Platform API
//!
//! The request/response surface the CLI depends on. Commands only ever see
//! [`PlatformApi`]; [`HttpPlatformClient`] is the reqwest-backed implementation.

use crate::context::ResourcePath;
use crate::error::RemoteError;
use async_trait::async_trait;

pub mod client;
pub mod models;

pub use client::{ClientSettings, HttpPlatformClient};
pub use models::{
    Component, ComponentEndpoint, ComponentResource, CreateEnvironmentRequest, Entity,
    Environment, ErrorBody, Event, EventHandle, EventStatus, Genesis, Organization, Project, Step,
    StepStatus, Violation,
};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Remote operations against the environment-management platform.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn list_organizations(&self) -> RemoteResult<Vec<Organization>>;
    async fn lookup_organization(&self, id: &str) -> RemoteResult<Organization>;

    async fn list_projects(&self, organization_id: &str) -> RemoteResult<Vec<Project>>;
    async fn lookup_project(&self, id: &str) -> RemoteResult<Project>;

    async fn list_environments(&self, project_id: &str) -> RemoteResult<Vec<Environment>>;
    async fn lookup_environment(&self, id: &str) -> RemoteResult<Environment>;

    async fn list_components(&self, environment_id: &str) -> RemoteResult<Vec<Component>>;
    async fn lookup_component(&self, id: &str) -> RemoteResult<Component>;
    async fn list_component_resources(
        &self,
        component_id: &str,
    ) -> RemoteResult<Vec<ComponentResource>>;

    async fn create_environment(
        &self,
        request: &CreateEnvironmentRequest,
    ) -> RemoteResult<Environment>;
    async fn deploy_environment(&self, id: &str) -> RemoteResult<Event>;
    async fn start_environment(&self, id: &str) -> RemoteResult<Event>;
    async fn stop_environment(&self, id: &str) -> RemoteResult<Event>;
    async fn delete_environment(&self, id: &str) -> RemoteResult<Event>;
    async fn environment_endpoints(&self, id: &str) -> RemoteResult<Vec<ComponentEndpoint>>;

    async fn get_event(&self, id: &str) -> RemoteResult<Event>;
    async fn list_events(&self, environment_id: Option<&str>) -> RemoteResult<Vec<Event>>;

    async fn start_remote_development(
        &self,
        component_id: &str,
        resource: &ResourcePath,
    ) -> RemoteResult<Component>;
    async fn stop_remote_development(
        &self,
        component_id: &str,
        resource: &ResourcePath,
    ) -> RemoteResult<Component>;
}
