//! Semver calculation from classified commits.

use semver::{BuildMetadata, Prerelease, Version};

use crate::error::VersionError;
use crate::history::Commit;

use super::ChangeLevel;

/// Ensure `min_bump <= max_bump`.
pub fn validate_bump_range(
    min_bump: ChangeLevel,
    max_bump: ChangeLevel,
) -> Result<(), VersionError> {
    if min_bump > max_bump {
        return Err(VersionError::InvalidBumpRange {
            min: min_bump,
            max: max_bump,
        });
    }
    Ok(())
}

/// Overall change level of a history, clamped to `[min_bump, max_bump]`.
///
/// An empty history is always `NoChange`, whatever `min_bump` says.
pub fn overall_level(
    commits: &[Commit],
    min_bump: ChangeLevel,
    max_bump: ChangeLevel,
) -> Result<ChangeLevel, VersionError> {
    validate_bump_range(min_bump, max_bump)?;

    if commits.is_empty() {
        return Ok(ChangeLevel::NoChange);
    }

    let level = commits
        .iter()
        .map(Commit::level)
        .fold(ChangeLevel::NoChange, ChangeLevel::greater);

    Ok(level.greater(min_bump).lesser(max_bump))
}

/// Calculate the next version based on commits.
///
/// - Major resets minor and patch
/// - Minor resets patch
/// - Any increment drops pre-release and build metadata
/// - `NoChange` returns `current` untouched
pub fn next_version(
    current: &Version,
    commits: &[Commit],
    min_bump: ChangeLevel,
    max_bump: ChangeLevel,
) -> Result<Version, VersionError> {
    let level = overall_level(commits, min_bump, max_bump)?;
    apply_bump(current, level)
}

/// Apply a single increment to a version.
///
/// Fails when the incremented component is already `u64::MAX`.
pub fn apply_bump(current: &Version, level: ChangeLevel) -> Result<Version, VersionError> {
    let increment = |component: u64| {
        component
            .checked_add(1)
            .ok_or_else(|| VersionError::ComponentOverflow {
                version: current.to_string(),
                level,
            })
    };

    let mut next = match level {
        ChangeLevel::NoChange => return Ok(current.clone()),
        ChangeLevel::Patch => Version::new(current.major, current.minor, increment(current.patch)?),
        ChangeLevel::Minor => Version::new(current.major, increment(current.minor)?, 0),
        ChangeLevel::Major => Version::new(increment(current.major)?, 0, 0),
    };
    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;
    Ok(next)
}

/// Parse a version, accepting an optional leading `v`.
pub fn parse_version(input: &str) -> Result<Version, semver::Error> {
    let trimmed = input.trim();
    Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed))
}
