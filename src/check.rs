//! Pre-merge check that a pull request will classify.
//!
//! A pull request passes when it carries a recognized label, or when every
//! one of its commits has a recognized message prefix.

use serde::Serialize;
use tracing::debug;

use crate::classify::{classify_labels, classify_message, has_recognized_prefix, recognized_labels};
use crate::error::CheckError;
use crate::github::{GitHubApi, RepoId};
use crate::version::ChangeLevel;

/// How a passing pull request was classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckSource {
    Labels,
    Commits,
}

/// Result of a passing check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullCheck {
    pub number: u64,
    pub change_level: ChangeLevel,
    pub source: CheckSource,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// Check pull request `number` of `repo` (`owner/name`).
pub async fn check_pull_request<A: GitHubApi + ?Sized>(
    api: &A,
    repo: &str,
    number: u64,
) -> Result<PullCheck, CheckError> {
    let RepoId { owner, name } = repo
        .parse::<RepoId>()
        .map_err(|e| CheckError::InvalidRepository(e.0))?;

    let pull = api.get_pull_request(&owner, &name, number).await?;
    let labels = recognized_labels(&pull.labels);

    if !labels.is_empty() {
        debug!(number, labels = ?labels, "Pull request has recognized labels");
        return Ok(PullCheck {
            number,
            change_level: classify_labels(&pull.labels),
            source: CheckSource::Labels,
            labels,
        });
    }

    let commits = api.list_pull_request_commits(&owner, &name, number).await?;
    if commits.is_empty() {
        return Err(CheckError::NoLabelsOrCommits(number));
    }

    let unclassified: Vec<String> = commits
        .iter()
        .filter(|commit| !has_recognized_prefix(&commit.message))
        .map(|commit| commit.sha.clone())
        .collect();
    if !unclassified.is_empty() {
        return Err(CheckError::Unclassified {
            number,
            commits: unclassified,
        });
    }

    let change_level = commits
        .iter()
        .map(|commit| classify_message(&commit.message))
        .max()
        .unwrap_or_default();

    Ok(PullCheck {
        number,
        change_level,
        source: CheckSource::Commits,
        labels: Vec::new(),
    })
}
