//! Repository identifiers in `owner/name` form.

use std::fmt;
use std::str::FromStr;

/// A GitHub repository, `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

/// The input was not exactly `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRepoId(pub String);

impl FromStr for RepoId {
    type Err = InvalidRepoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();

        match parts.as_slice() {
            [owner, name] if !owner.trim().is_empty() && !name.trim().is_empty() => Ok(RepoId {
                owner: owner.trim().to_string(),
                name: name.trim().to_string(),
            }),
            _ => Err(InvalidRepoId(s.to_string())),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
