//! Wire models for the platform API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::{Level, ResourcePath};

/// Anything the resolver can list, pick from, and follow upwards.
pub trait Entity {
    const LEVEL: Level;

    fn id(&self) -> &str;
    fn name(&self) -> &str;
    /// Identifier of the parent entity one level up.
    fn parent_id(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub organization: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: String,
    pub name: String,
    pub project: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub operation_status: Option<String>,
    #[serde(default)]
    pub cluster_status: Option<String>,
    #[serde(default, rename = "type")]
    pub environment_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    pub name: String,
    pub environment: String,
    #[serde(default)]
    pub operation_status: Option<String>,
    #[serde(default)]
    pub cluster_status: Option<String>,
}

impl Entity for Organization {
    const LEVEL: Level = Level::Organization;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent_id(&self) -> Option<&str> {
        None
    }
}

impl Entity for Project {
    const LEVEL: Level = Level::Project;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.organization)
    }
}

impl Entity for Environment {
    const LEVEL: Level = Level::Environment;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.project)
    }
}

impl Entity for Component {
    const LEVEL: Level = Level::Component;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.environment)
    }
}

/// A Kubernetes resource backing a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentResource {
    pub namespace: String,
    pub kind: String,
    pub name: String,
}

impl ComponentResource {
    pub fn path(&self) -> ResourcePath {
        ResourcePath::new(&self.namespace, &self.kind, &self.name)
    }
}

/// Public endpoints exposed by a component once deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEndpoint {
    pub component: String,
    pub name: String,
    #[serde(default)]
    pub hosts: Vec<String>,
}

/// Status of an asynchronous operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[serde(alias = "queued")]
    Pending,
    #[serde(alias = "in_progress", alias = "aborting")]
    Running,
    #[serde(alias = "success")]
    Succeeded,
    #[serde(alias = "fail", alias = "error")]
    Failed,
    #[serde(alias = "aborted", alias = "cancelled")]
    Canceled,
    /// A status this client does not know yet; watched like a running one.
    #[serde(other)]
    Unknown,
}

impl EventStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EventStatus::Succeeded | EventStatus::Failed | EventStatus::Canceled
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Running => "running",
            EventStatus::Succeeded => "succeeded",
            EventStatus::Failed => "failed",
            EventStatus::Canceled => "canceled",
            EventStatus::Unknown => "unknown",
        }
    }
}

/// Status of a single pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[serde(alias = "queued")]
    Pending,
    #[serde(alias = "in_progress")]
    Running,
    #[serde(alias = "success")]
    Succeeded,
    #[serde(alias = "fail", alias = "error")]
    Failed,
    Skipped,
    #[serde(alias = "aborted", alias = "cancelled")]
    Canceled,
}

impl StepStatus {
    pub fn is_finished(self) -> bool {
        !matches!(self, StepStatus::Pending | StepStatus::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
            StepStatus::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub status: EventStatus,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Event {
    /// First step that reported a failure, if any.
    pub fn failed_step(&self) -> Option<&Step> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }
}

/// Handle returned by any action that starts an asynchronous operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHandle {
    pub id: String,
    pub event_type: String,
    pub status: EventStatus,
}

impl From<&Event> for EventHandle {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            event_type: event.event_type.clone(),
            status: event.status,
        }
    }
}

/// Where a new environment's definition comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Genesis {
    FromGitSpec {
        spec: String,
    },
    FromTemplate {
        template: String,
    },
    FromString {
        yaml: String,
    },
    #[serde(rename_all = "camelCase")]
    FromGit {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        yaml_path: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnvironmentRequest {
    pub name: String,
    pub project: String,
    pub genesis: Genesis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_integration: Option<String>,
}

/// A field-level validation error reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(default)]
    pub property_path: Option<String>,
    pub message: String,
}

/// Error payload of a rejected request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

/// A page of a HAL collection response.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "_embedded")]
    pub embedded: Embedded<T>,
    #[serde(default, rename = "totalItems")]
    pub total_items: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Embedded<T> {
    #[serde(default = "Vec::new")]
    pub item: Vec<T>,
}
