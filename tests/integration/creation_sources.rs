//! Property tests for creation-source exclusivity.

use bns::error::CommandError;
use bns::executor::CreateSource;
use proptest::prelude::*;
use std::path::PathBuf;

fn source(flags: [bool; 4], value: &str) -> CreateSource {
    let pick = |on: bool| on.then(|| value.to_string());
    CreateSource {
        git_spec: pick(flags[0]),
        template: pick(flags[1]),
        yaml_path: flags[2].then(|| PathBuf::from(value)),
        git_repo: pick(flags[3]),
        git_branch: None,
        git_path: None,
    }
}

/// Any combination other than exactly one source is ambiguous.
#[test]
fn test_source_count_decides_ambiguity() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(any::<[bool; 4]>(), "[a-z0-9./:-]{1,24}"),
            |(flags, value)| {
                let given = flags.iter().filter(|on| **on).count();
                let result = source(flags, &value).validate();

                if given == 1 {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(result.unwrap(), source(flags, &value).provided()[0]);
                } else {
                    prop_assert!(matches!(result, Err(CommandError::AmbiguousSource(_))));
                }
                Ok(())
            },
        )
        .unwrap();
}

/// Empty values do not count as a supplied source.
#[test]
fn test_empty_values_are_not_sources() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&any::<[bool; 4]>(), |flags| {
            let empty = source(flags, "");
            prop_assert!(empty.provided().is_empty());
            prop_assert!(matches!(
                empty.validate(),
                Err(CommandError::AmbiguousSource(_))
            ));
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_git_branch_requires_git_repo() {
    let mut spec = source([false, true, false, false], "tpl");
    spec.git_branch = Some("main".into());
    assert!(matches!(
        spec.validate(),
        Err(CommandError::InvalidArgument(_))
    ));

    let mut repo = source([false, false, false, true], "https://git.example.test/app.git");
    repo.git_branch = Some("main".into());
    repo.git_path = Some("env/bunnyshell.yaml".into());
    assert_eq!(repo.validate().unwrap(), "--from-git-repo");
}
