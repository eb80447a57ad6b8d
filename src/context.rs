//! Context store: the organization/project/environment/component selection
//! for one command invocation.
//!
//! Plain accessors only. Filling gaps is the resolver's job.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A level of the platform hierarchy, ordered from least to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Organization,
    Project,
    Environment,
    Component,
    Resource,
}

impl Level {
    pub const CHAIN: [Level; 4] = [
        Level::Organization,
        Level::Project,
        Level::Environment,
        Level::Component,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Organization => "organization",
            Level::Project => "project",
            Level::Environment => "environment",
            Level::Component => "component",
            Level::Resource => "resource",
        }
    }

    /// The level directly above this one, if any.
    pub fn parent(self) -> Option<Level> {
        match self {
            Level::Organization => None,
            Level::Project => Some(Level::Organization),
            Level::Environment => Some(Level::Project),
            Level::Component => Some(Level::Environment),
            Level::Resource => Some(Level::Component),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cluster resource in `namespace/kind/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourcePath {
    pub namespace: String,
    pub kind: String,
    pub name: String,
}

impl ResourcePath {
    pub fn new(
        namespace: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl FromStr for ResourcePath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [namespace, kind, name]
                if !namespace.is_empty() && !kind.is_empty() && !name.is_empty() =>
            {
                Ok(ResourcePath::new(*namespace, *kind, *name))
            }
            _ => Err(format!(
                "invalid resource '{}': expected namespace/kind/name",
                s
            )),
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.kind, self.name)
    }
}

/// Selected identifiers for the current invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub organization: Option<String>,
    pub project: Option<String>,
    pub environment: Option<String>,
    pub component: Option<String>,
    pub resource: Option<ResourcePath>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organization(mut self, id: impl Into<String>) -> Self {
        self.organization = Some(id.into());
        self
    }

    pub fn with_project(mut self, id: impl Into<String>) -> Self {
        self.project = Some(id.into());
        self
    }

    pub fn with_environment(mut self, id: impl Into<String>) -> Self {
        self.environment = Some(id.into());
        self
    }

    pub fn with_component(mut self, id: impl Into<String>) -> Self {
        self.component = Some(id.into());
        self
    }

    pub fn with_resource(mut self, resource: ResourcePath) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Identifier stored for a chain level. `Resource` is not an identifier.
    pub fn id(&self, level: Level) -> Option<&str> {
        match level {
            Level::Organization => self.organization.as_deref(),
            Level::Project => self.project.as_deref(),
            Level::Environment => self.environment.as_deref(),
            Level::Component => self.component.as_deref(),
            Level::Resource => None,
        }
    }

    pub fn set_id(&mut self, level: Level, id: impl Into<String>) {
        let id = Some(id.into());
        match level {
            Level::Organization => self.organization = id,
            Level::Project => self.project = id,
            Level::Environment => self.environment = id,
            Level::Component => self.component = id,
            Level::Resource => {}
        }
    }

    pub fn clear(&mut self, level: Level) {
        match level {
            Level::Organization => self.organization = None,
            Level::Project => self.project = None,
            Level::Environment => self.environment = None,
            Level::Component => self.component = None,
            Level::Resource => self.resource = None,
        }
    }

    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    ///
    /// Values in `self` below the shallowest overridden level are dropped:
    /// they were chosen under a parent the override may have replaced.
    pub fn overlay(mut self, overrides: &Context) -> Self {
        if let Some(shallowest) = Level::CHAIN
            .iter()
            .copied()
            .find(|level| overrides.id(*level).is_some())
        {
            for level in [Level::Project, Level::Environment, Level::Component, Level::Resource] {
                if level > shallowest {
                    self.clear(level);
                }
            }
        }
        if overrides.organization.is_some() {
            self.organization = overrides.organization.clone();
        }
        if overrides.project.is_some() {
            self.project = overrides.project.clone();
        }
        if overrides.environment.is_some() {
            self.environment = overrides.environment.clone();
        }
        if overrides.component.is_some() {
            self.component = overrides.component.clone();
        }
        if overrides.resource.is_some() {
            self.resource = overrides.resource.clone();
        }
        self
    }
}
