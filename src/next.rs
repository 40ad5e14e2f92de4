//! Computing the next release version for a repository.
//!
//! Flow:
//! 1. Validate every caller input (no GitHub calls yet)
//! 2. Pick the base: explicit ref, else the latest release's tag
//! 3. Walk the history from head back to base
//! 4. Classify, clamp and bump

use std::fmt;

use semver::Version;
use serde::Serialize;
use tracing::{debug, info};

use crate::classify::recognized_labels;
use crate::error::{NextError, PolicyViolation};
use crate::github::{GitHubApi, RepoId};
use crate::history::{Commit, Pull, diff_commits, unlabeled_commits};
use crate::version::{ChangeLevel, apply_bump, overall_level, parse_version, validate_bump_range};

/// Caller inputs for [`compute_next`], as raw strings.
///
/// Empty strings mean "not supplied".
#[derive(Debug, Clone, Default)]
pub struct NextOptions {
    /// Repository in `owner/name` form.
    pub repo: String,
    /// Previous release ref. Empty uses the latest release's tag.
    pub base: String,
    /// Ref being evaluated for the next release.
    pub head: String,
    /// Previous version. Empty derives it from the base ref or release.
    pub previous_version: String,
    /// Minimum bump token. Empty means `none`.
    pub min_bump: String,
    /// Maximum bump token. Empty means `major`.
    pub max_bump: String,
}

/// A pull request in the result, with only its recognized labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultPull {
    pub number: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "ChangeLevel::is_no_change")]
    pub change_level: ChangeLevel,
}

/// A commit in the result with its computed level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultCommit {
    pub sha: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pulls: Vec<ResultPull>,
    #[serde(skip_serializing_if = "ChangeLevel::is_no_change")]
    pub change_level: ChangeLevel,
}

/// A commit whose pull requests carry no recognized label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlabeledCommit {
    pub sha: String,
    pub pulls: Vec<u64>,
}

impl fmt::Display for UnlabeledCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pulls = self
            .pulls
            .iter()
            .map(|number| format!("#{}", number))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} ({})", self.sha, pulls)
    }
}

impl NextOptions {
    /// Check every input without contacting GitHub.
    ///
    /// [`compute_next`] runs the same checks; callers use this to reject bad
    /// input before setting up a client.
    pub fn validate(&self) -> Result<(), NextError> {
        validate(self).map(|_| ())
    }
}

/// Outcome of a version computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextResult {
    pub next_version: Version,
    pub previous_version: Version,
    pub change_level: ChangeLevel,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commits: Vec<ResultCommit>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unlabeled: Vec<UnlabeledCommit>,
}

impl NextResult {
    /// Whether the computed version differs from the previous one.
    pub fn has_change(&self) -> bool {
        self.next_version != self.previous_version
    }
}

/// Outcome checks the caller wants enforced.
#[derive(Debug, Clone, Copy, Default)]
pub struct Policy {
    /// Fail when a commit came from pull requests without a recognized label.
    pub require_labels: bool,
    /// Fail when the version does not change.
    pub require_change: bool,
}

/// Inputs after validation.
struct Validated {
    repo: RepoId,
    min_bump: ChangeLevel,
    max_bump: ChangeLevel,
    previous_version: Option<Version>,
}

fn parse_bump(token: &str, default: ChangeLevel) -> Result<ChangeLevel, NextError> {
    if token.trim().is_empty() {
        return Ok(default);
    }
    Ok(token.parse()?)
}

fn validate(options: &NextOptions) -> Result<Validated, NextError> {
    let min_bump = parse_bump(&options.min_bump, ChangeLevel::NoChange)?;
    let max_bump = parse_bump(&options.max_bump, ChangeLevel::Major)?;
    validate_bump_range(min_bump, max_bump)?;

    let previous_version = match options.previous_version.trim() {
        "" => None,
        raw => Some(
            parse_version(raw).map_err(|e| NextError::InvalidVersion(raw.to_string(), e))?,
        ),
    };

    let repo = options
        .repo
        .parse::<RepoId>()
        .map_err(|e| NextError::InvalidRepository(e.0))?;

    Ok(Validated {
        repo,
        min_bump,
        max_bump,
        previous_version,
    })
}

/// Compute the next version of `options.repo`.
///
/// Policy is not enforced here; see [`enforce_policy`].
pub async fn compute_next<A: GitHubApi + ?Sized>(
    api: &A,
    options: &NextOptions,
) -> Result<NextResult, NextError> {
    let validated = validate(options)?;
    let RepoId { owner, name } = &validated.repo;

    let head = match options.head.trim() {
        "" => "HEAD",
        head => head,
    };

    let (base, previous_version) = match options.base.trim() {
        "" => match api.latest_release(owner, name).await? {
            Some(release) => {
                debug!(release = %release.name, tag = %release.tag, "Using latest release as base");
                let version = match validated.previous_version {
                    Some(version) => version,
                    None => parse_version(&release.tag)
                        .or_else(|_| parse_version(&release.name))
                        .map_err(|_| NextError::UnderivableVersion(release.tag.clone()))?,
                };
                (Some(release.tag), version)
            }
            None => {
                info!(repo = %validated.repo, "No previous release, computing first release");
                (
                    None,
                    validated.previous_version.unwrap_or_else(|| Version::new(0, 0, 0)),
                )
            }
        },
        base => {
            let version = match validated.previous_version {
                Some(version) => version,
                None => parse_version(base)
                    .map_err(|_| NextError::UnderivableVersion(base.to_string()))?,
            };
            (Some(base.to_string()), version)
        }
    };

    let commits = diff_commits(api, owner, name, base.as_deref(), head).await?;

    let change_level = overall_level(&commits, validated.min_bump, validated.max_bump)?;
    let next_version = apply_bump(&previous_version, change_level)?;

    info!(
        previous = %previous_version,
        next = %next_version,
        level = %change_level,
        commits = commits.len(),
        "Computed next version"
    );

    Ok(NextResult {
        next_version,
        previous_version,
        change_level,
        unlabeled: unlabeled_commits(&commits)
            .into_iter()
            .map(|commit| UnlabeledCommit {
                sha: commit.sha.clone(),
                pulls: commit.pulls.iter().map(|p| p.number).collect(),
            })
            .collect(),
        commits: commits.iter().map(result_commit).collect(),
    })
}

fn result_commit(commit: &Commit) -> ResultCommit {
    ResultCommit {
        sha: commit.sha.clone(),
        message: commit.message.clone(),
        pulls: commit.pulls.iter().map(result_pull).collect(),
        change_level: commit.level(),
    }
}

fn result_pull(pull: &Pull) -> ResultPull {
    ResultPull {
        number: pull.number,
        labels: recognized_labels(&pull.labels),
        change_level: pull.level(),
    }
}

/// Apply the caller's policy to a computed result.
///
/// Unlabeled commits are reported before a missing change.
pub fn enforce_policy(result: &NextResult, policy: Policy) -> Result<(), PolicyViolation> {
    if policy.require_labels && !result.unlabeled.is_empty() {
        let lines: Vec<String> = result.unlabeled.iter().map(ToString::to_string).collect();
        return Err(PolicyViolation::UnlabeledCommits(lines.join("\n")));
    }

    if policy.require_change && !result.has_change() {
        return Err(PolicyViolation::NoChange);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VersionError;
    use crate::github::{CommitPage, MockGitHubApi, Release, RepoCommit};
    use mockall::predicate::eq;

    fn options(repo: &str, base: &str, head: &str) -> NextOptions {
        NextOptions {
            repo: repo.to_string(),
            base: base.to_string(),
            head: head.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_invalid_min_bump() {
        let mock = MockGitHubApi::new();
        let opts = NextOptions {
            min_bump: "foo".to_string(),
            ..Default::default()
        };
        let err = compute_next(&mock, &opts).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid change level: foo");
    }

    #[tokio::test]
    async fn test_invalid_max_bump() {
        let mock = MockGitHubApi::new();
        let opts = NextOptions {
            max_bump: "foo".to_string(),
            ..Default::default()
        };
        let err = compute_next(&mock, &opts).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid change level: foo");
    }

    #[tokio::test]
    async fn test_invalid_previous_version() {
        let mock = MockGitHubApi::new();
        let opts = NextOptions {
            previous_version: "foo".to_string(),
            ..Default::default()
        };
        let err = compute_next(&mock, &opts).await.unwrap_err();
        assert!(matches!(err, NextError::InvalidVersion(ref v, _) if v == "foo"));
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_invalid_repo() {
        let mock = MockGitHubApi::new();
        let opts = NextOptions {
            repo: "foo".to_string(),
            previous_version: "1.2.3".to_string(),
            ..Default::default()
        };
        let err = compute_next(&mock, &opts).await.unwrap_err();
        assert!(matches!(err, NextError::InvalidRepository(ref r) if r == "foo"));
    }

    #[tokio::test]
    async fn test_min_bump_above_max_bump() {
        // No expectations: any GitHub call would panic.
        let mock = MockGitHubApi::new();
        let opts = NextOptions {
            repo: "willabides/semver-next".to_string(),
            min_bump: "major".to_string(),
            max_bump: "minor".to_string(),
            ..Default::default()
        };
        let err = compute_next(&mock, &opts).await.unwrap_err();
        assert!(matches!(
            err,
            NextError::Version(VersionError::InvalidBumpRange { .. })
        ));
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_base_must_be_semver_without_previous_version() {
        let mock = MockGitHubApi::new();
        let err = compute_next(&mock, &options("o/r", "release-candidate", "main"))
            .await
            .unwrap_err();
        assert!(matches!(err, NextError::UnderivableVersion(_)));
    }

    #[test]
    fn test_validate_without_client() {
        let bad_range = NextOptions {
            repo: "o/r".to_string(),
            min_bump: "major".to_string(),
            max_bump: "minor".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            bad_range.validate(),
            Err(NextError::Version(VersionError::InvalidBumpRange { .. }))
        ));

        let bad_repo = NextOptions {
            repo: "o/r/x".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            bad_repo.validate(),
            Err(NextError::InvalidRepository(_))
        ));

        assert!(options("o/r", "v1.0.0", "main").validate().is_ok());
    }

    #[tokio::test]
    async fn test_latest_release_seeds_base() {
        let mut mock = MockGitHubApi::new();

        mock.expect_latest_release()
            .with(eq("o"), eq("r"))
            .times(1)
            .returning(|_, _| {
                Ok(Some(Release {
                    name: "Release 1.4.0".to_string(),
                    tag: "v1.4.0".to_string(),
                }))
            });
        mock.expect_resolve_commit_sha()
            .with(eq("o"), eq("r"), eq("v1.4.0"))
            .returning(|_, _, _| Ok("base".to_string()));
        mock.expect_list_commits()
            .with(eq("o"), eq("r"), eq("main"), eq(1u32), eq(100u8))
            .returning(|_, _, _, _, _| {
                Ok(CommitPage {
                    commits: vec![
                        RepoCommit {
                            sha: "c1".to_string(),
                            message: "fix: bug".to_string(),
                        },
                        RepoCommit {
                            sha: "base".to_string(),
                            message: "release".to_string(),
                        },
                    ],
                    has_next_page: false,
                })
            });
        mock.expect_list_merged_pulls_for_commit()
            .returning(|_, _, _| Ok(vec![]));

        let result = compute_next(&mock, &options("o/r", "", "main")).await.unwrap();
        assert_eq!(result.previous_version, Version::new(1, 4, 0));
        assert_eq!(result.next_version, Version::new(1, 4, 1));
    }

    #[tokio::test]
    async fn test_release_with_non_semver_tag_uses_name() {
        let mut mock = MockGitHubApi::new();

        mock.expect_latest_release().returning(|_, _| {
            Ok(Some(Release {
                name: "2.0.0".to_string(),
                tag: "release-2024-01".to_string(),
            }))
        });
        mock.expect_resolve_commit_sha()
            .with(eq("o"), eq("r"), eq("release-2024-01"))
            .returning(|_, _, _| Ok("base".to_string()));
        mock.expect_list_commits().returning(|_, _, _, _, _| {
            Ok(CommitPage {
                commits: vec![RepoCommit {
                    sha: "base".to_string(),
                    message: String::new(),
                }],
                has_next_page: false,
            })
        });

        let result = compute_next(&mock, &options("o/r", "", "main")).await.unwrap();
        assert_eq!(result.previous_version, Version::new(2, 0, 0));
        assert_eq!(result.next_version, Version::new(2, 0, 0));
    }

    #[tokio::test]
    async fn test_first_release_walks_all_history() {
        let mut mock = MockGitHubApi::new();

        mock.expect_latest_release().returning(|_, _| Ok(None));
        mock.expect_resolve_commit_sha().never();
        mock.expect_list_commits().returning(|_, _, _, _, _| {
            Ok(CommitPage {
                commits: vec![RepoCommit {
                    sha: "c1".to_string(),
                    message: "feat: initial".to_string(),
                }],
                has_next_page: false,
            })
        });
        mock.expect_list_merged_pulls_for_commit()
            .returning(|_, _, _| Ok(vec![]));

        let result = compute_next(&mock, &options("o/r", "", "main")).await.unwrap();
        assert_eq!(result.previous_version, Version::new(0, 0, 0));
        assert_eq!(result.next_version, Version::new(0, 1, 0));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut mock = MockGitHubApi::new();

        mock.expect_resolve_commit_sha().returning(|_, _, reference| {
            Err(crate::error::GitHubError::RefNotFound {
                reference: reference.to_string(),
            })
        });

        let err = compute_next(&mock, &options("o/r", "v1.0.0", "main"))
            .await
            .unwrap_err();
        assert!(matches!(err, NextError::GitHub(ref e) if e.is_not_found()));
        assert!(!err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_patch_component_overflow_is_reported() {
        let mut mock = MockGitHubApi::new();

        mock.expect_resolve_commit_sha()
            .returning(|_, _, _| Ok("base".to_string()));
        mock.expect_list_commits().returning(|_, _, _, _, _| {
            Ok(CommitPage {
                commits: vec![
                    RepoCommit {
                        sha: "c1".to_string(),
                        message: "fix: x".to_string(),
                    },
                    RepoCommit {
                        sha: "base".to_string(),
                        message: String::new(),
                    },
                ],
                has_next_page: false,
            })
        });
        mock.expect_list_merged_pulls_for_commit()
            .returning(|_, _, _| Ok(vec![]));

        let opts = NextOptions {
            previous_version: "0.0.18446744073709551615".to_string(),
            ..options("o/r", "v1.0.0", "main")
        };
        let err = compute_next(&mock, &opts).await.unwrap_err();
        assert!(matches!(
            err,
            NextError::Version(VersionError::ComponentOverflow { .. })
        ));
        assert!(!err.is_invalid_input());
    }

    fn result_with(unlabeled: Vec<UnlabeledCommit>, changed: bool) -> NextResult {
        let previous = Version::new(0, 15, 0);
        NextResult {
            next_version: if changed {
                Version::new(0, 15, 1)
            } else {
                previous.clone()
            },
            previous_version: previous,
            change_level: if changed {
                ChangeLevel::Patch
            } else {
                ChangeLevel::NoChange
            },
            commits: vec![],
            unlabeled,
        }
    }

    #[test]
    fn test_policy_passes_by_default() {
        let result = result_with(
            vec![UnlabeledCommit {
                sha: "aaa".to_string(),
                pulls: vec![1],
            }],
            false,
        );
        assert!(enforce_policy(&result, Policy::default()).is_ok());
    }

    #[test]
    fn test_policy_require_labels() {
        let result = result_with(
            vec![UnlabeledCommit {
                sha: "sha2".to_string(),
                pulls: vec![2, 3],
            }],
            true,
        );
        let policy = Policy {
            require_labels: true,
            ..Default::default()
        };
        let err = enforce_policy(&result, policy).unwrap_err();
        assert!(err.to_string().contains("sha2 (#2, #3)"));
    }

    #[test]
    fn test_policy_require_change() {
        let policy = Policy {
            require_change: true,
            ..Default::default()
        };
        assert_eq!(
            enforce_policy(&result_with(vec![], false), policy),
            Err(PolicyViolation::NoChange)
        );
        assert!(enforce_policy(&result_with(vec![], true), policy).is_ok());
    }

    #[test]
    fn test_json_omits_empty_and_unchanged_fields() {
        let result = NextResult {
            next_version: Version::new(1, 0, 0),
            previous_version: Version::new(0, 15, 0),
            change_level: ChangeLevel::Major,
            commits: vec![ResultCommit {
                sha: "sha2".to_string(),
                message: String::new(),
                pulls: vec![],
                change_level: ChangeLevel::NoChange,
            }],
            unlabeled: vec![],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "next_version": "1.0.0",
                "previous_version": "0.15.0",
                "change_level": "major",
                "commits": [{ "sha": "sha2" }]
            })
        );
    }
}
