//! Resource resolver
//!
//! Turns a partial [`Context`] into a fully resolved chain
//! organization → project → environment → component → resource.
//!
//! The deepest identifier already present anchors the chain: the anchor is
//! looked up directly and its ancestors are derived by following parent
//! links, so a component ID alone is enough to pin down the whole hierarchy.
//! Above a project or environment anchor, explicit ids are looked up too and
//! must agree with the derived parents.
//! Levels below the anchor are listed under their resolved parent and picked
//! through a [`Selector`]. The first failing lookup aborts resolution.

use crate::api::{Entity, PlatformApi};
use crate::context::{Context, Level, ResourcePath};
use crate::error::{CommandError, RemoteError};
use serde::Serialize;
use tracing::{debug, warn};

mod selector;

pub use selector::{
    for_session, Candidate, NonInteractive, ScriptedSelector, Selection, Selector,
    TerminalSelector,
};

/// A resolved hierarchy member, owned by the caller for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEntity {
    pub level: Level,
    pub id: String,
    pub name: String,
    pub parent: Option<String>,
}

impl ResolvedEntity {
    pub fn from_entity<E: Entity>(entity: &E) -> Self {
        Self {
            level: E::LEVEL,
            id: entity.id().to_string(),
            name: entity.name().to_string(),
            parent: entity.parent_id().map(str::to_string),
        }
    }

    fn candidate(&self) -> Candidate {
        Candidate {
            id: self.id.clone(),
            label: format!("{} ({})", self.name, self.id),
        }
    }
}

/// Output of a resolution, filled down to the requested level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedChain {
    pub organization: Option<ResolvedEntity>,
    pub project: Option<ResolvedEntity>,
    pub environment: Option<ResolvedEntity>,
    pub component: Option<ResolvedEntity>,
    pub resource: Option<ResourcePath>,
}

impl ResolvedChain {
    pub fn get(&self, level: Level) -> Option<&ResolvedEntity> {
        match level {
            Level::Organization => self.organization.as_ref(),
            Level::Project => self.project.as_ref(),
            Level::Environment => self.environment.as_ref(),
            Level::Component => self.component.as_ref(),
            Level::Resource => None,
        }
    }

    /// The resolved entity for `level`, or `SelectionRequired` if resolution
    /// stopped above it.
    pub fn require(&self, level: Level) -> Result<&ResolvedEntity, CommandError> {
        self.get(level)
            .ok_or(CommandError::SelectionRequired { level })
    }

    pub fn id(&self, level: Level) -> Option<&str> {
        self.get(level).map(|e| e.id.as_str())
    }

    fn set(&mut self, entity: ResolvedEntity) {
        match entity.level {
            Level::Organization => self.organization = Some(entity),
            Level::Project => self.project = Some(entity),
            Level::Environment => self.environment = Some(entity),
            Level::Component => self.component = Some(entity),
            Level::Resource => {}
        }
    }
}

pub struct Resolver<'a> {
    api: &'a dyn PlatformApi,
    selector: &'a mut dyn Selector,
}

impl<'a> Resolver<'a> {
    pub fn new(api: &'a dyn PlatformApi, selector: &'a mut dyn Selector) -> Self {
        Self { api, selector }
    }

    /// Resolve `context` down to `target`, writing every resolved identifier
    /// back into `context`.
    pub async fn resolve(
        &mut self,
        context: &mut Context,
        target: Level,
    ) -> Result<ResolvedChain, CommandError> {
        let deepest = target.min(Level::Component);
        let levels: Vec<Level> = Level::CHAIN
            .iter()
            .copied()
            .filter(|level| *level <= deepest)
            .collect();

        let mut chain = ResolvedChain::default();
        let anchor = levels
            .iter()
            .rev()
            .copied()
            .find(|level| context.id(*level).is_some());

        let mut walk_from = 0;
        if let Some(anchor) = anchor {
            self.resolve_anchor(context, anchor, &mut chain).await?;
            walk_from = levels
                .iter()
                .position(|level| *level == anchor)
                .map(|i| i + 1)
                .unwrap_or(levels.len());
        }

        for level in &levels[walk_from..] {
            let parent_id = level
                .parent()
                .and_then(|parent| chain.id(parent))
                .map(str::to_string);
            let candidates = self.list(*level, parent_id.as_deref()).await?;
            let entity = self.pick(*level, candidates)?;
            debug!(level = %level, id = %entity.id, "selected");
            context.set_id(*level, entity.id.clone());
            chain.set(entity);
        }

        if target == Level::Resource {
            let resource = match context.resource.clone() {
                Some(resource) => resource,
                None => {
                    let component = chain.require(Level::Component)?.id.clone();
                    self.pick_resource(&component).await?
                }
            };
            context.resource = Some(resource.clone());
            chain.resource = Some(resource);
        }

        Ok(chain)
    }

    /// Look up the anchor and derive every ancestor through parent links.
    ///
    /// Under a component anchor, stale ancestor ids are replaced by the
    /// derived ones. Under a project or environment anchor each explicit
    /// ancestor is looked up itself and must own the level below it.
    async fn resolve_anchor(
        &mut self,
        context: &mut Context,
        anchor: Level,
        chain: &mut ResolvedChain,
    ) -> Result<(), CommandError> {
        let anchor_id = context.id(anchor).unwrap_or_default().to_string();
        let mut entity = self.lookup(anchor, &anchor_id).await?;
        debug!(level = %anchor, id = %entity.id, "resolved anchor");

        let strict = anchor != Level::Component;
        let mut explicit: Vec<ResolvedEntity> = Vec::new();
        if strict {
            for level in Level::CHAIN.iter().copied().filter(|l| *l < anchor) {
                if let Some(id) = context.id(level).map(str::to_string) {
                    explicit.push(self.lookup(level, &id).await?);
                }
            }
        }

        loop {
            let level = entity.level;
            let parent = entity.parent.clone();
            let (Some(parent_level), Some(parent_id)) = (level.parent(), parent) else {
                chain.set(entity);
                break;
            };
            match context.id(parent_level) {
                Some(expected) if expected != parent_id && strict => {
                    return Err(CommandError::ContextMismatch {
                        level,
                        id: entity.id,
                        parent: parent_level,
                        expected: expected.to_string(),
                    });
                }
                Some(explicit_id) if explicit_id != parent_id => {
                    warn!(
                        level = %parent_level,
                        explicit = %explicit_id,
                        derived = %parent_id,
                        "ignoring {} that does not own the selected {}",
                        parent_level,
                        level
                    );
                }
                _ => {}
            }
            chain.set(entity);
            context.set_id(parent_level, parent_id.clone());
            let known = explicit.iter().position(|e| e.level == parent_level);
            entity = match known {
                Some(found) => explicit.swap_remove(found),
                None => self.lookup(parent_level, &parent_id).await?,
            };
        }
        Ok(())
    }

    async fn lookup(&self, level: Level, id: &str) -> Result<ResolvedEntity, CommandError> {
        let result = match level {
            Level::Organization => self
                .api
                .lookup_organization(id)
                .await
                .map(|e| ResolvedEntity::from_entity(&e)),
            Level::Project => self
                .api
                .lookup_project(id)
                .await
                .map(|e| ResolvedEntity::from_entity(&e)),
            Level::Environment => self
                .api
                .lookup_environment(id)
                .await
                .map(|e| ResolvedEntity::from_entity(&e)),
            Level::Component => self
                .api
                .lookup_component(id)
                .await
                .map(|e| ResolvedEntity::from_entity(&e)),
            Level::Resource => {
                return Err(CommandError::InvalidArgument(
                    "resources are not looked up by id".to_string(),
                ))
            }
        };
        result.map_err(|e| lookup_error(level, id, e))
    }

    async fn list(
        &self,
        level: Level,
        parent_id: Option<&str>,
    ) -> Result<Vec<ResolvedEntity>, CommandError> {
        let parent = || {
            parent_id.ok_or(CommandError::SelectionRequired {
                level: level.parent().unwrap_or(level),
            })
        };
        let result: Result<Vec<ResolvedEntity>, RemoteError> = match level {
            Level::Organization => self
                .api
                .list_organizations()
                .await
                .map(|items| items.iter().map(ResolvedEntity::from_entity).collect()),
            Level::Project => self
                .api
                .list_projects(parent()?)
                .await
                .map(|items| items.iter().map(ResolvedEntity::from_entity).collect()),
            Level::Environment => self
                .api
                .list_environments(parent()?)
                .await
                .map(|items| items.iter().map(ResolvedEntity::from_entity).collect()),
            Level::Component => self
                .api
                .list_components(parent()?)
                .await
                .map(|items| items.iter().map(ResolvedEntity::from_entity).collect()),
            Level::Resource => Ok(Vec::new()),
        };
        result.map_err(|source| CommandError::Lookup { level, source })
    }

    fn pick(
        &mut self,
        level: Level,
        candidates: Vec<ResolvedEntity>,
    ) -> Result<ResolvedEntity, CommandError> {
        let offered: Vec<Candidate> = candidates.iter().map(ResolvedEntity::candidate).collect();
        let index = self.choose(level, &offered)?;
        candidates
            .into_iter()
            .nth(index)
            .ok_or(CommandError::SelectionAborted { level })
    }

    async fn pick_resource(&mut self, component_id: &str) -> Result<ResourcePath, CommandError> {
        let resources = self
            .api
            .list_component_resources(component_id)
            .await
            .map_err(|source| CommandError::Lookup {
                level: Level::Resource,
                source,
            })?;
        let paths: Vec<ResourcePath> = resources.iter().map(|r| r.path()).collect();
        let offered: Vec<Candidate> = paths
            .iter()
            .map(|p| Candidate {
                id: p.to_string(),
                label: p.to_string(),
            })
            .collect();
        let index = self.choose(Level::Resource, &offered)?;
        paths
            .into_iter()
            .nth(index)
            .ok_or(CommandError::SelectionAborted {
                level: Level::Resource,
            })
    }

    fn choose(&mut self, level: Level, offered: &[Candidate]) -> Result<usize, CommandError> {
        if offered.is_empty() {
            return Err(CommandError::NoCandidates { level });
        }
        match self.selector.select(level, offered) {
            Selection::Picked(index) => Ok(index),
            Selection::Aborted => Err(CommandError::SelectionAborted { level }),
            Selection::Unavailable => Err(CommandError::SelectionRequired { level }),
        }
    }
}

fn lookup_error(level: Level, id: &str, error: RemoteError) -> CommandError {
    match error {
        RemoteError::NotFound(_) => CommandError::NotFound {
            level,
            id: id.to_string(),
        },
        source => CommandError::Lookup { level, source },
    }
}
