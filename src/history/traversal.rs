//! Walking a repository's history back to the previous release.
//!
//! The walk uses GitHub's list-commits endpoint for `head`, which returns
//! commits reachable from `head` newest first. The first listed commit whose
//! SHA equals the resolved base marks the boundary: it and everything after it
//! in the listing are excluded. If the listing ends before the base SHA shows
//! up (base not reachable from head), every listed commit is kept.
//!
//! GitHub's compare endpoint could produce the same set in one call, but its
//! notion of reachability can differ from the listing's for diverged
//! branches, so only the listing is used here.

use futures::future::join_all;
use tracing::debug;

use crate::error::GitHubError;
use crate::github::{GitHubApi, RepoCommit};

use super::Commit;

/// Commits requested per page.
pub const PAGE_SIZE: u8 = 100;

/// Maximum in-flight pull request lookups within one page.
pub const MAX_CONCURRENT_PULL_FETCHES: usize = 8;

/// Collect the commits strictly ahead of `base` on `head`.
///
/// When `base` is `None` (no previous release) the whole history of `head`
/// is collected. Any GitHub error aborts the walk; no partial list is
/// returned.
pub async fn diff_commits<A: GitHubApi + ?Sized>(
    api: &A,
    owner: &str,
    repo: &str,
    base: Option<&str>,
    head: &str,
) -> Result<Vec<Commit>, GitHubError> {
    let base_sha = match base {
        Some(reference) => {
            let sha = api.resolve_commit_sha(owner, repo, reference).await?;
            debug!(base = %reference, sha = %sha, "Resolved base reference");
            Some(sha)
        }
        None => None,
    };

    let mut commits = Vec::new();
    let mut page = 1u32;

    loop {
        let listing = api.list_commits(owner, repo, head, page, PAGE_SIZE).await?;

        let (retained, hit_base) = take_until_base(listing.commits, base_sha.as_deref());
        debug!(page, retained = retained.len(), hit_base, "Listed commits page");

        commits.extend(attach_pulls(api, owner, repo, retained).await?);

        if hit_base || !listing.has_next_page {
            break;
        }
        page += 1;
    }

    Ok(commits)
}

/// Split a page at the base SHA. Returns the commits before it and whether
/// it was found.
fn take_until_base(page: Vec<RepoCommit>, base_sha: Option<&str>) -> (Vec<RepoCommit>, bool) {
    let Some(base_sha) = base_sha else {
        return (page, false);
    };

    match page.iter().position(|commit| commit.sha == base_sha) {
        Some(index) => {
            let mut page = page;
            page.truncate(index);
            (page, true)
        }
        None => (page, false),
    }
}

/// Fetch merged pulls for each commit, in bounded concurrent batches.
///
/// Output order matches input order. When any lookup in a batch fails, the
/// remaining batches are not started and the batch's errors are joined.
async fn attach_pulls<A: GitHubApi + ?Sized>(
    api: &A,
    owner: &str,
    repo: &str,
    repo_commits: Vec<RepoCommit>,
) -> Result<Vec<Commit>, GitHubError> {
    let mut commits = Vec::with_capacity(repo_commits.len());

    for batch in repo_commits.chunks(MAX_CONCURRENT_PULL_FETCHES) {
        let results = join_all(
            batch
                .iter()
                .map(|repo_commit| build_commit(api, owner, repo, repo_commit)),
        )
        .await;

        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(commit) => commits.push(commit),
                Err(e) => errors.push(e),
            }
        }

        if let Some(error) = GitHubError::join(errors) {
            return Err(error);
        }
    }

    Ok(commits)
}

async fn build_commit<A: GitHubApi + ?Sized>(
    api: &A,
    owner: &str,
    repo: &str,
    repo_commit: &RepoCommit,
) -> Result<Commit, GitHubError> {
    let pulls = api
        .list_merged_pulls_for_commit(owner, repo, &repo_commit.sha)
        .await?;

    Ok(Commit {
        sha: repo_commit.sha.clone(),
        message: repo_commit.message.clone(),
        pulls,
    })
}
