//! Action executor against the in-memory platform.

use bns::api::{Genesis, Violation};
use bns::context::ResourcePath;
use bns::error::{CommandError, RemoteError};
use bns::executor::{
    Action, ActionExecutor, ActionOutcome, CreateEnvironment, CreateSource, FROM_TEMPLATE,
    GENERIC_SUBJECT,
};
use std::io::Write;

use crate::integration::fake_platform::{transport, FakePlatform};

fn from_template(name: &str) -> CreateEnvironment {
    CreateEnvironment {
        name: name.into(),
        project: "proj-1".into(),
        source: CreateSource {
            template: Some("tpl-42".into()),
            ..Default::default()
        },
        kubernetes_integration: Some("k8s-1".into()),
    }
}

fn template_violation() -> RemoteError {
    RemoteError::Rejected {
        status: 422,
        message: "Unprocessable Entity".into(),
        violations: vec![Violation {
            property_path: Some("genesis.template".into()),
            message: "template tpl-42 does not exist".into(),
        }],
    }
}

#[tokio::test]
async fn rejected_create_is_attributed_to_its_source_flag_and_skips_deploy() {
    let platform = FakePlatform::sample();
    platform.fail_create(template_violation());

    let err = ActionExecutor::new(&platform)
        .create_and_deploy(from_template("preview"))
        .await
        .unwrap_err();

    match err {
        CommandError::ValidationFailed {
            subject,
            violations,
        } => {
            assert_eq!(subject, FROM_TEMPLATE);
            assert_eq!(violations[0].message, "template tpl-42 does not exist");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(platform.count("create_environment"), 1);
    assert_eq!(platform.count("deploy_environment"), 0);
}

#[tokio::test]
async fn rejected_git_repo_create_is_attributed_to_the_arguments() {
    let platform = FakePlatform::sample();
    platform.fail_create(RemoteError::Rejected {
        status: 422,
        message: "Unprocessable Entity".into(),
        violations: vec![Violation {
            property_path: Some("genesis.fromGit.branch".into()),
            message: "branch nope does not exist".into(),
        }],
    });
    let mut request = from_template("preview");
    request.source = CreateSource {
        git_repo: Some("https://git.example.test/app.git".into()),
        git_branch: Some("nope".into()),
        ..Default::default()
    };

    let err = ActionExecutor::new(&platform)
        .create_environment(request)
        .await
        .unwrap_err();

    match err {
        CommandError::ValidationFailed { subject, .. } => assert_eq!(subject, GENERIC_SUBJECT),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn failed_deploy_after_create_names_the_new_environment() {
    let platform = FakePlatform::sample();
    platform.fail_deploy(transport());

    let err = ActionExecutor::new(&platform)
        .create_and_deploy(from_template("preview"))
        .await
        .unwrap_err();

    assert_eq!(err.created_resource(), Some("env-new"));
    match err {
        CommandError::DeployAfterCreate {
            environment_id,
            source,
        } => {
            assert_eq!(environment_id, "env-new");
            assert!(matches!(
                *source,
                CommandError::Remote(RemoteError::Transport(_))
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(platform.created().len(), 1, "no rollback of the created environment");
    assert_eq!(platform.count("delete_environment"), 0);
}

#[tokio::test]
async fn create_and_deploy_returns_environment_and_event() {
    let platform = FakePlatform::sample();

    let done = ActionExecutor::new(&platform)
        .create_and_deploy(from_template("preview"))
        .await
        .unwrap();

    assert_eq!(done.environment.id, "env-new");
    assert_eq!(done.environment.name, "preview");
    assert_eq!(done.event.id, "ev-deploy-env-new");
    assert_eq!(
        platform.calls(),
        vec!["create_environment:preview", "deploy_environment:env-new"]
    );

    let sent = &platform.created()[0];
    assert_eq!(
        sent.genesis,
        Genesis::FromTemplate {
            template: "tpl-42".into()
        }
    );
    assert_eq!(sent.kubernetes_integration.as_deref(), Some("k8s-1"));
}

#[tokio::test]
async fn missing_source_never_reaches_the_platform() {
    let platform = FakePlatform::sample();
    let mut request = from_template("preview");
    request.source = CreateSource::default();

    let err = ActionExecutor::new(&platform)
        .create_environment(request)
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::AmbiguousSource(_)));
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn two_sources_never_reach_the_platform() {
    let platform = FakePlatform::sample();
    let mut request = from_template("preview");
    request.source.git_spec = Some("https://git.example.test/env.yaml".into());

    let err = ActionExecutor::new(&platform)
        .execute(Action::CreateEnvironment(request))
        .await
        .unwrap_err();

    match err {
        CommandError::AmbiguousSource(message) => {
            assert!(message.contains("--from-git"));
            assert!(message.contains("--from-template"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn deploy_without_kubernetes_integration_is_rejected_locally() {
    let platform = FakePlatform::sample();
    let mut request = from_template("preview");
    request.kubernetes_integration = None;

    let err = ActionExecutor::new(&platform)
        .create_and_deploy(request)
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::InvalidArgument(_)));
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn local_yaml_is_sent_inline() {
    let platform = FakePlatform::sample();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "kind: Environment\nname: preview").unwrap();

    let request = CreateEnvironment {
        name: "preview".into(),
        project: "proj-1".into(),
        source: CreateSource {
            yaml_path: Some(file.path().to_path_buf()),
            ..Default::default()
        },
        kubernetes_integration: None,
    };
    let environment = ActionExecutor::new(&platform)
        .create_environment(request)
        .await
        .unwrap();

    assert_eq!(environment.id, "env-new");
    match &platform.created()[0].genesis {
        Genesis::FromString { yaml } => assert!(yaml.contains("kind: Environment")),
        other => panic!("unexpected genesis: {other:?}"),
    }
}

#[tokio::test]
async fn environment_actions_return_event_handles() {
    let platform = FakePlatform::sample();
    let executor = ActionExecutor::new(&platform);

    let actions = [
        Action::DeployEnvironment {
            environment: "env-1".into(),
        },
        Action::StartEnvironment {
            environment: "env-1".into(),
        },
        Action::StopEnvironment {
            environment: "env-1".into(),
        },
        Action::DeleteEnvironment {
            environment: "env-1".into(),
        },
    ];
    let mut ids = Vec::new();
    for action in actions {
        match executor.execute(action).await.unwrap() {
            ActionOutcome::Event(handle) => ids.push(handle.id),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert_eq!(
        ids,
        vec![
            "ev-deploy-env-1",
            "ev-start-env-1",
            "ev-stop-env-1",
            "ev-delete-env-1"
        ]
    );
}

#[tokio::test]
async fn remote_development_targets_the_component_resource() {
    let platform = FakePlatform::sample();
    let executor = ActionExecutor::new(&platform);
    let resource = ResourcePath::new("env-1", "Deployment", "api");

    let up = executor
        .execute(Action::StartRemoteDevelopment {
            component: "comp-1".into(),
            resource: resource.clone(),
        })
        .await
        .unwrap();
    match up {
        ActionOutcome::Component(component) => {
            assert_eq!(component.operation_status.as_deref(), Some("remote_dev"))
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    executor
        .execute(Action::StopRemoteDevelopment {
            component: "comp-1".into(),
            resource,
        })
        .await
        .unwrap();

    assert_eq!(
        platform.calls(),
        vec![
            "start_remote_development:comp-1@env-1/Deployment/api",
            "stop_remote_development:comp-1@env-1/Deployment/api"
        ]
    );
}
