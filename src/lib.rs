//! semver-next - compute the next semantic version of a GitHub repository.
//!
//! # Overview
//!
//! semver-next walks the commits between the previous release and a target
//! ref, classifies each one by its message prefixes and the labels of the
//! pull requests that merged it, and bumps the previous version by the
//! highest change level found, clamped to a caller-supplied range.

pub mod check;
pub mod classify;
pub mod error;
pub mod github;
pub mod history;
pub mod next;
pub mod version;

// Re-export commonly used types
pub use check::{CheckSource, PullCheck, check_pull_request};
pub use error::{CheckError, GitHubError, NextError, PolicyViolation, VersionError};
pub use github::{GitHubApi, OctocrabClient, RepoId, create_release_tag};
pub use history::{Commit, Pull};
pub use next::{NextOptions, NextResult, Policy, compute_next, enforce_policy};
pub use version::ChangeLevel;
