//! Creation sources for new environments. Exactly one may be supplied.

use crate::api::Genesis;
use crate::error::CommandError;
use std::path::PathBuf;

pub const FROM_GIT: &str = "--from-git";
pub const FROM_TEMPLATE: &str = "--from-template";
pub const FROM_PATH: &str = "--from-path";
pub const FROM_GIT_REPO: &str = "--from-git-repo";
/// Subject used for violations that cannot be tied to a specific flag.
pub const GENERIC_SUBJECT: &str = "arguments";

/// Raw source flags as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSource {
    /// URL of an environment spec inside a git repository.
    pub git_spec: Option<String>,
    pub template: Option<String>,
    /// Local environment YAML, sent inline.
    pub yaml_path: Option<PathBuf>,
    pub git_repo: Option<String>,
    pub git_branch: Option<String>,
    pub git_path: Option<String>,
}

impl CreateSource {
    /// Primary source flags that carry a non-empty value.
    pub fn provided(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if is_set(&self.git_spec) {
            flags.push(FROM_GIT);
        }
        if is_set(&self.template) {
            flags.push(FROM_TEMPLATE);
        }
        if self
            .yaml_path
            .as_ref()
            .is_some_and(|p| !p.as_os_str().is_empty())
        {
            flags.push(FROM_PATH);
        }
        if is_set(&self.git_repo) {
            flags.push(FROM_GIT_REPO);
        }
        flags
    }

    /// Check flag combinations without touching the filesystem.
    pub fn validate(&self) -> Result<&'static str, CommandError> {
        let provided = self.provided();
        let flag = match provided.as_slice() {
            [flag] => *flag,
            [] => {
                return Err(CommandError::AmbiguousSource(format!(
                    "none of {}, {}, {} or {} was given",
                    FROM_GIT, FROM_TEMPLATE, FROM_PATH, FROM_GIT_REPO
                )))
            }
            many => {
                return Err(CommandError::AmbiguousSource(format!(
                    "{} are mutually exclusive",
                    many.join(", ")
                )))
            }
        };

        if flag != FROM_GIT_REPO && (is_set(&self.git_branch) || is_set(&self.git_path)) {
            return Err(CommandError::InvalidArgument(
                "--from-git-branch and --from-git-path require --from-git-repo".to_string(),
            ));
        }
        Ok(flag)
    }

    /// Validate and build the request genesis, reading `--from-path` content.
    pub fn into_genesis(self) -> Result<Genesis, CommandError> {
        let flag = self.validate()?;
        let genesis = match flag {
            FROM_GIT => Genesis::FromGitSpec {
                spec: self.git_spec.unwrap_or_default(),
            },
            FROM_TEMPLATE => Genesis::FromTemplate {
                template: self.template.unwrap_or_default(),
            },
            FROM_PATH => {
                let path = self.yaml_path.unwrap_or_default();
                let yaml = std::fs::read_to_string(&path).map_err(|e| {
                    CommandError::InvalidArgument(format!(
                        "Failed to read {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Genesis::FromString { yaml }
            }
            _ => Genesis::FromGit {
                url: self.git_repo.unwrap_or_default(),
                branch: self.git_branch.filter(|s| !s.is_empty()),
                yaml_path: self.git_path.filter(|s| !s.is_empty()),
            },
        };
        Ok(genesis)
    }
}

/// Subject that platform violations for a genesis are attributed to.
///
/// A git repository source is spread over up to three flags, so its
/// violations go to the generic subject.
pub fn violation_subject(genesis: &Genesis) -> &'static str {
    match genesis {
        Genesis::FromGitSpec { .. } => FROM_GIT,
        Genesis::FromTemplate { .. } => FROM_TEMPLATE,
        Genesis::FromString { .. } => FROM_PATH,
        Genesis::FromGit { .. } => GENERIC_SUBJECT,
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_ref().is_some_and(|v| !v.is_empty())
}
