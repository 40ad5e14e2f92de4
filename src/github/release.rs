//! Release tag creation.

use tracing::info;

use crate::error::GitHubError;

use super::GitHubApi;

/// Tag `target_ref` as `tag_name`.
///
/// Resolves the target to a commit SHA, creates an annotated tag object
/// whose message is the tag name, then points `refs/tags/<tag_name>` at it.
pub async fn create_release_tag<A: GitHubApi + ?Sized>(
    api: &A,
    owner: &str,
    repo: &str,
    tag_name: &str,
    target_ref: &str,
) -> Result<(), GitHubError> {
    let target_sha = api.resolve_commit_sha(owner, repo, target_ref).await?;
    let tag_sha = api.create_tag(owner, repo, tag_name, &target_sha).await?;

    let ref_name = format!("refs/tags/{}", tag_name);
    api.create_ref(owner, repo, &ref_name, &tag_sha).await?;

    info!(tag = %tag_name, commit = %target_sha, "Created release tag");
    Ok(())
}
