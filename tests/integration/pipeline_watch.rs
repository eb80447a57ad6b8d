//! Pipeline watcher with a paused clock.

use bns::api::{EventStatus, StepStatus};
use bns::error::{CommandError, RemoteError};
use bns::pipeline::{CancelToken, PipelineOutcome, PipelineWatcher, StepTransition, WatchConfig};
use std::time::Duration;

use crate::integration::fake_platform::{event, step, transport, FakePlatform};

fn config() -> WatchConfig {
    WatchConfig {
        poll_interval: Duration::from_secs(2),
        timeout: Duration::from_secs(10),
        max_retries: 3,
        retry_backoff: Duration::from_millis(100),
    }
}

#[tokio::test(start_paused = true)]
async fn reports_each_step_transition_once() {
    let platform = FakePlatform::sample();
    platform.script_events([
        Ok(event(
            "ev-1",
            EventStatus::Pending,
            vec![step("build", StepStatus::Pending)],
        )),
        Ok(event(
            "ev-1",
            EventStatus::Running,
            vec![step("build", StepStatus::Running)],
        )),
        Ok(event(
            "ev-1",
            EventStatus::Running,
            vec![step("build", StepStatus::Running)],
        )),
        Ok(event(
            "ev-1",
            EventStatus::Succeeded,
            vec![
                step("build", StepStatus::Succeeded),
                step("deploy", StepStatus::Succeeded),
            ],
        )),
    ]);

    let mut seen: Vec<StepTransition> = Vec::new();
    let outcome = PipelineWatcher::new(&platform, config())
        .watch("ev-1", &CancelToken::new(), |t| seen.push(t.clone()))
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(platform.count("get_event"), 4);
    let reported: Vec<(String, StepStatus)> =
        seen.iter().map(|t| (t.name.clone(), t.status)).collect();
    assert_eq!(
        reported,
        vec![
            ("build".to_string(), StepStatus::Pending),
            ("build".to_string(), StepStatus::Running),
            ("build".to_string(), StepStatus::Succeeded),
            ("deploy".to_string(), StepStatus::Succeeded),
        ]
    );
    assert_eq!(seen[2].previous, Some(StepStatus::Running));
    assert_eq!(seen[3].index, 1);
}

#[tokio::test(start_paused = true)]
async fn unrecognised_event_status_keeps_polling() {
    let platform = FakePlatform::sample();
    platform.script_events([
        Ok(event("ev-1", EventStatus::Unknown, vec![])),
        Ok(event("ev-1", EventStatus::Unknown, vec![])),
        Ok(event("ev-1", EventStatus::Succeeded, vec![])),
    ]);

    let outcome = PipelineWatcher::new(&platform, config())
        .watch("ev-1", &CancelToken::new(), |_| {})
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(platform.count("get_event"), 3);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_the_wait_budget() {
    let platform = FakePlatform::sample();
    platform.script_events([Ok(event("ev-1", EventStatus::Running, vec![]))]);

    let err = PipelineWatcher::new(&platform, config())
        .watch("ev-1", &CancelToken::new(), |_| {})
        .await
        .unwrap_err();

    match err {
        CommandError::WatchTimedOut { event_id, waited } => {
            assert_eq!(event_id, "ev-1");
            assert!(waited >= Duration::from_secs(10));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // polls at 0, 2, 4, 6, 8 and 10 seconds
    assert_eq!(platform.count("get_event"), 6);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_the_watch() {
    let platform = FakePlatform::sample();
    platform.script_events([Ok(event(
        "ev-1",
        EventStatus::Running,
        vec![step("build", StepStatus::Running)],
    ))]);

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let err = PipelineWatcher::new(&platform, config())
        .watch("ev-1", &cancel, |_| trigger.cancel())
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::WatchAborted { ref event_id } if event_id == "ev-1"));
    assert_eq!(platform.count("get_event"), 1);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_are_unreachable_not_failed() {
    let platform = FakePlatform::sample();
    platform.script_events([
        Err(transport()),
        Err(transport()),
        Err(transport()),
        Err(transport()),
        Ok(event("ev-1", EventStatus::Succeeded, vec![])),
    ]);

    let err = PipelineWatcher::new(&platform, config())
        .watch("ev-1", &CancelToken::new(), |_| {})
        .await
        .unwrap_err();

    match err {
        CommandError::WatchUnreachable {
            attempts,
            last_error,
            ..
        } => {
            assert_eq!(attempts, 4);
            assert!(matches!(last_error, RemoteError::Transport(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(platform.count("get_event"), 4);
}

#[tokio::test(start_paused = true)]
async fn transient_errors_within_budget_are_absorbed() {
    let platform = FakePlatform::sample();
    platform.script_events([
        Err(transport()),
        Err(RemoteError::Rejected {
            status: 503,
            message: "Service Unavailable".into(),
            violations: vec![],
        }),
        Ok(event("ev-1", EventStatus::Succeeded, vec![])),
    ]);

    let outcome = PipelineWatcher::new(&platform, config())
        .watch("ev-1", &CancelToken::new(), |_| {})
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(platform.count("get_event"), 3);
}

#[tokio::test(start_paused = true)]
async fn unknown_event_is_not_retried() {
    let platform = FakePlatform::sample();

    let err = PipelineWatcher::new(&platform, config())
        .watch("ev-missing", &CancelToken::new(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, CommandError::Remote(RemoteError::NotFound(_))));
    assert_eq!(platform.count("get_event"), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_pipeline_names_the_failing_step() {
    let platform = FakePlatform::sample();
    let mut failing = step("deploy", StepStatus::Failed);
    failing.error = Some("image pull failed".into());
    platform.script_events([
        Ok(event(
            "ev-1",
            EventStatus::Running,
            vec![step("build", StepStatus::Running)],
        )),
        Ok(event(
            "ev-1",
            EventStatus::Failed,
            vec![step("build", StepStatus::Succeeded), failing],
        )),
    ]);

    let mut failures = Vec::new();
    let outcome = PipelineWatcher::new(&platform, config())
        .watch("ev-1", &CancelToken::new(), |t| {
            if t.status == StepStatus::Failed {
                failures.push(t.error.clone());
            }
        })
        .await
        .unwrap();

    match &outcome {
        PipelineOutcome::Failed { step, error, .. } => {
            assert_eq!(step.as_deref(), Some("deploy"));
            assert_eq!(error.as_deref(), Some("image pull failed"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(failures, vec![Some("image pull failed".to_string())]);
    assert!(matches!(
        outcome.into_result(),
        Err(CommandError::PipelineFailed { ref status, .. }) if status == "failed"
    ));
}

#[tokio::test(start_paused = true)]
async fn canceled_pipeline_is_terminal() {
    let platform = FakePlatform::sample();
    platform.script_events([Ok(event("ev-1", EventStatus::Canceled, vec![]))]);

    let outcome = PipelineWatcher::new(&platform, config())
        .watch("ev-1", &CancelToken::new(), |_| {})
        .await
        .unwrap();

    assert!(matches!(outcome, PipelineOutcome::Canceled { .. }));
    assert!(!outcome.is_success());
}
