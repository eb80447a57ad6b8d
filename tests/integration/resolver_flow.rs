//! Resolver against the in-memory platform.

use bns::context::{Context, Level, ResourcePath};
use bns::error::CommandError;
use bns::resolver::{NonInteractive, Resolver, ScriptedSelector, Selection};

use crate::integration::fake_platform::FakePlatform;

fn ids(chain: &bns::resolver::ResolvedChain) -> Vec<Option<String>> {
    Level::CHAIN
        .iter()
        .map(|level| chain.id(*level).map(str::to_string))
        .collect()
}

#[tokio::test]
async fn component_alone_resolves_the_same_chain_as_all_four_ids() {
    let platform = FakePlatform::sample();

    let mut sparse = Context::new().with_component("comp-2");
    let mut selector = NonInteractive;
    let from_component = Resolver::new(&platform, &mut selector)
        .resolve(&mut sparse, Level::Component)
        .await
        .unwrap();

    let mut full = Context::new()
        .with_organization("org-1")
        .with_project("proj-1")
        .with_environment("env-1")
        .with_component("comp-2");
    let mut selector = NonInteractive;
    let from_all = Resolver::new(&platform, &mut selector)
        .resolve(&mut full, Level::Component)
        .await
        .unwrap();

    assert_eq!(ids(&from_component), ids(&from_all));
    assert_eq!(sparse, full, "resolved ids are written back into the context");
    assert_eq!(platform.count("list_environments"), 0);
    assert_eq!(platform.count("list_components"), 0);
}

#[tokio::test]
async fn invalid_environment_fails_before_component_resolution() {
    let platform = FakePlatform::sample();
    let mut context = Context::new()
        .with_organization("org-1")
        .with_project("proj-1")
        .with_environment("env-missing");
    let mut selector = NonInteractive;

    let err = Resolver::new(&platform, &mut selector)
        .resolve(&mut context, Level::Component)
        .await
        .unwrap_err();

    match err {
        CommandError::NotFound { level, id } => {
            assert_eq!(level, Level::Environment);
            assert_eq!(id, "env-missing");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(platform.count("list_components"), 0);
    assert_eq!(platform.count("lookup_component"), 0);
}

#[tokio::test]
async fn missing_level_without_a_terminal_requires_selection() {
    let platform = FakePlatform::sample();
    let mut context = Context::new().with_project("proj-1");
    let mut selector = NonInteractive;

    let err = Resolver::new(&platform, &mut selector)
        .resolve(&mut context, Level::Environment)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CommandError::SelectionRequired {
            level: Level::Environment
        }
    ));
    assert_eq!(context.organization.as_deref(), Some("org-1"));
}

#[tokio::test]
async fn interactive_selection_walks_the_hierarchy_in_order() {
    let platform = FakePlatform::sample();
    let mut context = Context::new();
    let mut selector = ScriptedSelector::new([
        Selection::Picked(0),
        Selection::Picked(0),
        Selection::Picked(0),
        Selection::Picked(1),
    ]);

    let chain = Resolver::new(&platform, &mut selector)
        .resolve(&mut context, Level::Component)
        .await
        .unwrap();

    assert_eq!(
        selector.asked_levels(),
        vec![
            Level::Organization,
            Level::Project,
            Level::Environment,
            Level::Component
        ]
    );
    assert_eq!(chain.id(Level::Component), Some("comp-2"));
    assert_eq!(context.environment.as_deref(), Some("env-1"));
    assert_eq!(context.component.as_deref(), Some("comp-2"));

    let offered: Vec<&str> = selector.asked()[3].1.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(offered, vec!["comp-1", "comp-2"], "only components of env-1 are offered");
}

#[tokio::test]
async fn declined_prompt_aborts_resolution() {
    let platform = FakePlatform::sample();
    let mut context = Context::new().with_environment("env-1");
    let mut selector = ScriptedSelector::new([Selection::Aborted]);

    let err = Resolver::new(&platform, &mut selector)
        .resolve(&mut context, Level::Component)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CommandError::SelectionAborted {
            level: Level::Component
        }
    ));
    assert!(context.component.is_none());
}

#[tokio::test]
async fn empty_level_reports_no_candidates() {
    let platform = FakePlatform::sample();
    let mut context = Context::new().with_organization("org-2");
    let mut selector = ScriptedSelector::new([Selection::Picked(0)]);

    let err = Resolver::new(&platform, &mut selector)
        .resolve(&mut context, Level::Environment)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CommandError::NoCandidates {
            level: Level::Environment
        }
    ));
}

#[tokio::test]
async fn resource_is_selected_among_component_resources() {
    let platform = FakePlatform::sample();
    let mut context = Context::new().with_component("comp-1");
    let mut selector = ScriptedSelector::new([Selection::Picked(1)]);

    let chain = Resolver::new(&platform, &mut selector)
        .resolve(&mut context, Level::Resource)
        .await
        .unwrap();

    let expected = ResourcePath::new("env-1", "StatefulSet", "db");
    assert_eq!(chain.resource.as_ref(), Some(&expected));
    assert_eq!(context.resource, Some(expected));
    assert_eq!(selector.asked_levels(), vec![Level::Resource]);
}

#[tokio::test]
async fn explicit_resource_skips_the_prompt() {
    let platform = FakePlatform::sample();
    let resource = ResourcePath::new("env-1", "Deployment", "api");
    let mut context = Context::new()
        .with_component("comp-1")
        .with_resource(resource.clone());
    let mut selector = NonInteractive;

    let chain = Resolver::new(&platform, &mut selector)
        .resolve(&mut context, Level::Resource)
        .await
        .unwrap();

    assert_eq!(chain.resource, Some(resource));
    assert_eq!(platform.count("list_component_resources"), 0);
}

#[tokio::test]
async fn ancestors_come_from_the_deepest_id() {
    let platform = FakePlatform::sample();
    // comp-1 lives in env-1; the stale env-2 is replaced.
    let mut context = Context::new()
        .with_environment("env-2")
        .with_component("comp-1");
    let mut selector = NonInteractive;

    let chain = Resolver::new(&platform, &mut selector)
        .resolve(&mut context, Level::Component)
        .await
        .unwrap();

    assert_eq!(chain.id(Level::Environment), Some("env-1"));
    assert_eq!(context.environment.as_deref(), Some("env-1"));
}

#[tokio::test]
async fn invalid_explicit_organization_above_a_project_is_not_found() {
    let platform = FakePlatform::sample();
    let mut context = Context::new()
        .with_organization("org-bogus")
        .with_project("proj-1");
    let mut selector = NonInteractive;

    let err = Resolver::new(&platform, &mut selector)
        .resolve(&mut context, Level::Project)
        .await
        .unwrap_err();

    match err {
        CommandError::NotFound { level, id } => {
            assert_eq!(level, Level::Organization);
            assert_eq!(id, "org-bogus");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(context.organization.as_deref(), Some("org-bogus"));
}

#[tokio::test]
async fn explicit_organization_must_own_the_explicit_project() {
    let platform = FakePlatform::sample();
    let mut context = Context::new()
        .with_organization("org-2")
        .with_project("proj-1");
    let mut selector = NonInteractive;

    let err = Resolver::new(&platform, &mut selector)
        .resolve(&mut context, Level::Environment)
        .await
        .unwrap_err();

    match err {
        CommandError::ContextMismatch {
            level,
            id,
            parent,
            expected,
        } => {
            assert_eq!(level, Level::Project);
            assert_eq!(id, "proj-1");
            assert_eq!(parent, Level::Organization);
            assert_eq!(expected, "org-2");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(platform.count("list_environments"), 0);
}

#[tokio::test]
async fn consistent_explicit_ancestors_are_each_looked_up_once() {
    let platform = FakePlatform::sample();
    let mut context = Context::new()
        .with_organization("org-1")
        .with_environment("env-2");
    let mut selector = NonInteractive;

    let chain = Resolver::new(&platform, &mut selector)
        .resolve(&mut context, Level::Environment)
        .await
        .unwrap();

    assert_eq!(chain.id(Level::Project), Some("proj-1"));
    assert_eq!(context.project.as_deref(), Some("proj-1"));
    assert_eq!(platform.count("lookup_organization"), 1);
    assert_eq!(platform.count("lookup_project"), 1);
}
