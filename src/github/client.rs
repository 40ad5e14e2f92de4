//! The set of GitHub operations the version computation depends on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GitHubError;
use crate::history::Pull;

/// A commit as listed by GitHub, before pull requests are attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoCommit {
    pub sha: String,
    pub message: String,
}

/// One page of a commit listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitPage {
    pub commits: Vec<RepoCommit>,
    pub has_next_page: bool,
}

/// The release marked "latest" on the repository's releases page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    pub tag: String,
}

/// GitHub operations used by semver-next.
///
/// This abstraction allows mocking GitHub in tests. Implementations own
/// retry and rate limiting; callers never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Resolve a tag, branch or SHA to a full commit SHA.
    async fn resolve_commit_sha(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> Result<String, GitHubError>;

    /// List commits reachable from `reference`, newest first. Pages start at 1.
    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        page: u32,
        per_page: u8,
    ) -> Result<CommitPage, GitHubError>;

    /// Merged pull requests that contain the commit.
    async fn list_merged_pulls_for_commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Vec<Pull>, GitHubError>;

    /// The latest release, or `None` when the repository has no release.
    async fn latest_release(&self, owner: &str, repo: &str) -> Result<Option<Release>, GitHubError>;

    /// Create an annotated tag object and return its SHA.
    async fn create_tag(
        &self,
        owner: &str,
        repo: &str,
        tag_name: &str,
        target_sha: &str,
    ) -> Result<String, GitHubError>;

    /// Create a git reference such as `refs/tags/v1.2.3`.
    async fn create_ref(
        &self,
        owner: &str,
        repo: &str,
        ref_name: &str,
        sha: &str,
    ) -> Result<(), GitHubError>;

    /// A single pull request with its labels.
    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Pull, GitHubError>;

    /// Every commit of a pull request.
    async fn list_pull_request_commits(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<RepoCommit>, GitHubError>;
}
