//! Error types for semver-next modules using thiserror.

use thiserror::Error;

use crate::version::ChangeLevel;

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "GitHub authentication failed: no valid auth found. Set GITHUB_TOKEN, GH_TOKEN or run 'gh auth login'"
    )]
    AuthenticationFailed,

    #[error("Reference not found: {reference}")]
    RefNotFound { reference: String },

    #[error("Repository not found: {owner}/{repo}")]
    RepositoryNotFound { owner: String, repo: String },

    #[error("Rate limited by GitHub API while trying to {operation}")]
    RateLimited { operation: String },

    #[error("GitHub API request failed while trying to {operation}: {source}")]
    Api {
        operation: String,
        #[source]
        source: Box<octocrab::Error>,
    },

    #[error("Failed to build GitHub client: {0}")]
    ClientBuild(#[source] Box<octocrab::Error>),

    #[error("{}", join_messages(.0))]
    Multiple(Vec<GitHubError>),
}

impl GitHubError {
    /// Combine errors from concurrent calls into a single value.
    ///
    /// Returns `None` for an empty list and the error itself when only one
    /// call failed.
    pub fn join(mut errors: Vec<GitHubError>) -> Option<GitHubError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(GitHubError::Multiple(errors)),
        }
    }

    /// Whether the error means the collaborator could not find something.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GitHubError::RefNotFound { .. } | GitHubError::RepositoryNotFound { .. }
        )
    }
}

fn join_messages(errors: &[GitHubError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("invalid change level: {0}")]
    InvalidChangeLevel(String),

    #[error("minBump must be less than or equal to maxBump (got {min} > {max})")]
    InvalidBumpRange { min: ChangeLevel, max: ChangeLevel },

    #[error("cannot apply a {level} bump to {version}: component overflows")]
    ComponentOverflow { version: String, level: ChangeLevel },
}

/// Errors from computing the next version.
#[derive(Error, Debug)]
pub enum NextError {
    #[error("repo must be in the form owner/name (got '{0}')")]
    InvalidRepository(String),

    #[error("invalid previous version \"{0}\": {1}")]
    InvalidVersion(String, #[source] semver::Error),

    #[error(
        "could not determine the previous version from '{0}'. Pass the previous version explicitly."
    )]
    UnderivableVersion(String),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),
}

impl NextError {
    /// Whether the error was raised while validating caller input.
    ///
    /// Everything except GitHub failures and a version component overflow
    /// is detected before any GitHub call.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(
            self,
            NextError::GitHub(_) | NextError::Version(VersionError::ComponentOverflow { .. })
        )
    }
}

/// The computation succeeded but the caller's policy rejects its outcome.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("commits from pull requests without a recognized label: {0}")]
    UnlabeledCommits(String),

    #[error("no version change detected")]
    NoChange,
}

impl PolicyViolation {
    /// Process exit code the CLI uses for this violation.
    pub fn exit_code(&self) -> i32 {
        match self {
            PolicyViolation::UnlabeledCommits(_) => 1,
            PolicyViolation::NoChange => 10,
        }
    }
}

/// Errors from the pull request pre-merge check.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("repo must be in the form owner/name (got '{0}')")]
    InvalidRepository(String),

    #[error(
        "pull request #{number} has no recognized label and these commits have no recognized message prefix: {}",
        .commits.join(", ")
    )]
    Unclassified { number: u64, commits: Vec<String> },

    #[error("pull request #{0} has no recognized label and no commits")]
    NoLabelsOrCommits(u64),

    #[error(transparent)]
    GitHub(#[from] GitHubError),
}
