//! GitHub token discovery.
//!
//! Auth order:
//! 1. An explicit token (from `--github-token`)
//! 2. GITHUB_TOKEN env var
//! 3. GH_TOKEN env var
//! 4. `gh auth token` (gh CLI)

use std::env;
use std::process::Command;

use tracing::debug;

use crate::error::GitHubError;

/// Get a GitHub token, preferring `explicit` when it is non-empty.
pub fn get_github_token(explicit: Option<&str>) -> Result<String, GitHubError> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = env::var(var) {
            let token = token.trim();
            if !token.is_empty() {
                debug!(source = var, "Using GitHub token from environment");
                return Ok(token.to_string());
            }
        }
    }

    if let Some(token) = get_token_from_gh_cli() {
        debug!(source = "gh", "Using GitHub token from gh CLI");
        return Ok(token);
    }

    Err(GitHubError::AuthenticationFailed)
}

/// Try to get a token from the gh CLI.
fn get_token_from_gh_cli() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;

    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}
