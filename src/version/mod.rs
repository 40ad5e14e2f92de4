//! Change levels and semver bumping.

pub mod bump;
pub mod level;

pub use bump::{apply_bump, next_version, overall_level, parse_version, validate_bump_range};
pub use level::ChangeLevel;
