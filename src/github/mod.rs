//! GitHub API operations using octocrab.

pub mod auth;
pub mod client;
pub mod octo;
pub mod release;
pub mod repo;
pub mod retry;

pub use auth::get_github_token;
#[cfg(test)]
pub use client::MockGitHubApi;
pub use client::{CommitPage, GitHubApi, Release, RepoCommit};
pub use octo::OctocrabClient;
pub use release::create_release_tag;
pub use repo::{InvalidRepoId, RepoId};
