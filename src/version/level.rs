//! Ordered change levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// How much change a commit or pull request represents.
///
/// Variants are declared in ascending order so the derived `Ord` is the
/// severity order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChangeLevel {
    #[default]
    #[serde(rename = "none")]
    NoChange,
    Patch,
    Minor,
    Major,
}

impl ChangeLevel {
    /// All levels, lowest first.
    pub const ALL: [ChangeLevel; 4] = [
        ChangeLevel::NoChange,
        ChangeLevel::Patch,
        ChangeLevel::Minor,
        ChangeLevel::Major,
    ];

    /// Returns whichever is higher, `self` or `other`.
    pub fn greater(self, other: ChangeLevel) -> ChangeLevel {
        self.max(other)
    }

    /// Returns whichever is lower, `self` or `other`.
    pub fn lesser(self, other: ChangeLevel) -> ChangeLevel {
        self.min(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeLevel::NoChange => "none",
            ChangeLevel::Patch => "patch",
            ChangeLevel::Minor => "minor",
            ChangeLevel::Major => "major",
        }
    }

    pub fn is_no_change(&self) -> bool {
        *self == ChangeLevel::NoChange
    }
}

impl fmt::Display for ChangeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeLevel {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::NoChange),
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            _ => Err(VersionError::InvalidChangeLevel(s.to_string())),
        }
    }
}
