//! Commits enriched with the pull requests that merged them.

use serde::{Deserialize, Serialize};

use crate::classify::{classify_labels, classify_message};
use crate::version::ChangeLevel;

/// A merged pull request and its labels, as returned by GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pull {
    pub number: u64,
    pub labels: Vec<String>,
}

impl Pull {
    /// Level derived from this pull's labels.
    pub fn level(&self) -> ChangeLevel {
        classify_labels(&self.labels)
    }
}

/// A commit between the previous release and the target ref.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub pulls: Vec<Pull>,
}

impl Commit {
    /// Highest level across the commit message and every associated pull.
    pub fn level(&self) -> ChangeLevel {
        self.pulls
            .iter()
            .map(Pull::level)
            .fold(classify_message(&self.message), ChangeLevel::greater)
    }
}
