//! `GitHubApi` backed by octocrab.
//!
//! Uses octocrab's generic route helpers with small response structs so only
//! the fields semver-next reads have to be present in GitHub's payloads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::{Octocrab, Page};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GitHubError;
use crate::history::Pull;

use super::client::{CommitPage, GitHubApi, Release, RepoCommit};
use super::retry::retry_rate_limited;

/// Items per page for the listings this client paginates itself.
const LIST_PAGE_SIZE: u8 = 100;

/// Octocrab-backed GitHub client.
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Octocrab,
}

impl OctocrabClient {
    /// Build a client authenticated with a personal token.
    ///
    /// `base_uri` overrides the API root, e.g. for GitHub Enterprise.
    pub fn new(token: &str, base_uri: Option<&str>) -> Result<Self, GitHubError> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(uri) = base_uri {
            builder = builder
                .base_uri(uri)
                .map_err(|e| GitHubError::ClientBuild(Box::new(e)))?;
        }
        let octocrab = builder
            .build()
            .map_err(|e| GitHubError::ClientBuild(Box::new(e)))?;
        Ok(Self { octocrab })
    }

    /// Fail with `RepositoryNotFound` unless `owner/repo` is visible.
    async fn ensure_repository(&self, owner: &str, repo: &str) -> Result<(), GitHubError> {
        let route = format!("/repos/{}/{}", owner, repo);
        retry_rate_limited(|| async {
            let result: Result<serde_json::Value, octocrab::Error> =
                self.octocrab.get(&route, None::<&()>).await;
            result.map_err(|e| {
                map_error(
                    e,
                    format!("get repository {}/{}", owner, repo),
                    repo_not_found(owner, repo),
                )
            })
        })
        .await?;
        Ok(())
    }

    /// Wrap a pre-configured octocrab client.
    ///
    /// This allows dependency injection for testing with mock servers.
    pub fn with_client(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }
}

#[derive(Deserialize)]
struct ShaResponse {
    sha: String,
}

#[derive(Deserialize)]
struct CommitItem {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    #[serde(default)]
    message: String,
}

impl From<CommitItem> for RepoCommit {
    fn from(item: CommitItem) -> Self {
        RepoCommit {
            sha: item.sha,
            message: item.commit.message,
        }
    }
}

#[derive(Deserialize)]
struct PullItem {
    number: u64,
    #[serde(default)]
    labels: Option<Vec<LabelItem>>,
    #[serde(default)]
    merged_at: Option<DateTime<Utc>>,
}

impl From<PullItem> for Pull {
    fn from(item: PullItem) -> Self {
        Pull {
            number: item.number,
            labels: item
                .labels
                .unwrap_or_default()
                .into_iter()
                .map(|l| l.name)
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct LabelItem {
    name: String,
}

#[derive(Deserialize)]
struct ReleaseItem {
    #[serde(default)]
    name: Option<String>,
    tag_name: String,
}

#[derive(Serialize)]
struct ListCommitsParams<'a> {
    sha: &'a str,
    per_page: u8,
    page: u32,
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Serialize)]
struct CreateTagBody<'a> {
    tag: &'a str,
    message: &'a str,
    object: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    reference: &'a str,
    sha: &'a str,
}

/// What a failed request means, judged from octocrab's error text.
enum Failure {
    RateLimited,
    NotFound,
    Other,
}

fn classify_failure(e: &octocrab::Error) -> Failure {
    // Check error content using both Display and Debug output
    // to handle different octocrab error formats
    let err_display = e.to_string();
    let err_debug = format!("{:?}", e);
    let display_lower = err_display.to_lowercase();
    let debug_lower = err_debug.to_lowercase();

    if display_lower.contains("rate limit") || debug_lower.contains("rate limit") {
        return Failure::RateLimited;
    }
    // 404 for unknown repos and refs, 422 "No commit found for SHA" for bad refs
    if err_display.contains("Not Found")
        || err_debug.contains("Not Found")
        || debug_lower.contains("no commit found")
    {
        return Failure::NotFound;
    }
    Failure::Other
}

/// Map an octocrab error; `not_found` decides what a 404 means for this call.
fn map_error(
    e: octocrab::Error,
    operation: String,
    not_found: impl FnOnce() -> GitHubError,
) -> GitHubError {
    match classify_failure(&e) {
        Failure::RateLimited => GitHubError::RateLimited { operation },
        Failure::NotFound => not_found(),
        Failure::Other => GitHubError::Api {
            operation,
            source: Box::new(e),
        },
    }
}

fn repo_not_found(owner: &str, repo: &str) -> impl FnOnce() -> GitHubError {
    let owner = owner.to_string();
    let repo = repo.to_string();
    move || GitHubError::RepositoryNotFound { owner, repo }
}

#[async_trait]
impl GitHubApi for OctocrabClient {
    async fn resolve_commit_sha(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> Result<String, GitHubError> {
        let route = format!("/repos/{}/{}/commits/{}", owner, repo, reference);
        let response = retry_rate_limited(|| async {
            let result: Result<ShaResponse, octocrab::Error> =
                self.octocrab.get(&route, None::<&()>).await;
            result.map_err(|e| {
                map_error(e, format!("resolve {}", reference), || {
                    GitHubError::RefNotFound {
                        reference: reference.to_string(),
                    }
                })
            })
        })
        .await?;
        Ok(response.sha)
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        page: u32,
        per_page: u8,
    ) -> Result<CommitPage, GitHubError> {
        let route = format!("/repos/{}/{}/commits", owner, repo);
        let params = ListCommitsParams {
            sha: reference,
            per_page,
            page,
        };
        let listing = retry_rate_limited(|| async {
            let result: Result<Page<CommitItem>, octocrab::Error> =
                self.octocrab.get(&route, Some(&params)).await;
            result.map_err(|e| {
                map_error(e, format!("list commits of {}", reference), || {
                    GitHubError::RefNotFound {
                        reference: reference.to_string(),
                    }
                })
            })
        })
        .await?;

        let has_next_page = listing.next.is_some();
        Ok(CommitPage {
            commits: listing.items.into_iter().map(RepoCommit::from).collect(),
            has_next_page,
        })
    }

    async fn list_merged_pulls_for_commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Vec<Pull>, GitHubError> {
        let route = format!("/repos/{}/{}/commits/{}/pulls", owner, repo, sha);
        let mut pulls = Vec::new();
        let mut page = 1u32;

        loop {
            let params = PageParams {
                per_page: LIST_PAGE_SIZE,
                page,
            };
            let listing = retry_rate_limited(|| async {
                let result: Result<Page<PullItem>, octocrab::Error> =
                    self.octocrab.get(&route, Some(&params)).await;
                result.map_err(|e| {
                    map_error(
                        e,
                        format!("list pull requests for {}", sha),
                        repo_not_found(owner, repo),
                    )
                })
            })
            .await?;

            let has_next_page = listing.next.is_some();
            // The endpoint also returns open and closed-unmerged pulls
            pulls.extend(
                listing
                    .items
                    .into_iter()
                    .filter(|p| p.merged_at.is_some())
                    .map(Pull::from),
            );

            if !has_next_page {
                break;
            }
            page += 1;
        }

        Ok(pulls)
    }

    async fn latest_release(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Option<Release>, GitHubError> {
        let route = format!("/repos/{}/{}/releases/latest", owner, repo);
        let result = retry_rate_limited(|| async {
            let result: Result<ReleaseItem, octocrab::Error> =
                self.octocrab.get(&route, None::<&()>).await;
            result.map_err(|e| {
                map_error(e, "get latest release".to_string(), repo_not_found(owner, repo))
            })
        })
        .await;

        match result {
            Ok(release) => Ok(Some(Release {
                name: release.name.unwrap_or_default(),
                tag: release.tag_name,
            })),
            // 404 means either no release or no repository
            Err(GitHubError::RepositoryNotFound { .. }) => {
                self.ensure_repository(owner, repo).await?;
                debug!(owner, repo, "No latest release");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_tag(
        &self,
        owner: &str,
        repo: &str,
        tag_name: &str,
        target_sha: &str,
    ) -> Result<String, GitHubError> {
        let route = format!("/repos/{}/{}/git/tags", owner, repo);
        let body = CreateTagBody {
            tag: tag_name,
            message: tag_name,
            object: target_sha,
            kind: "commit",
        };
        let response = retry_rate_limited(|| async {
            let result: Result<ShaResponse, octocrab::Error> =
                self.octocrab.post(&route, Some(&body)).await;
            result.map_err(|e| {
                map_error(
                    e,
                    format!("create tag {}", tag_name),
                    repo_not_found(owner, repo),
                )
            })
        })
        .await?;
        Ok(response.sha)
    }

    async fn create_ref(
        &self,
        owner: &str,
        repo: &str,
        ref_name: &str,
        sha: &str,
    ) -> Result<(), GitHubError> {
        let route = format!("/repos/{}/{}/git/refs", owner, repo);
        let body = CreateRefBody {
            reference: ref_name,
            sha,
        };
        retry_rate_limited(|| async {
            let result: Result<serde_json::Value, octocrab::Error> =
                self.octocrab.post(&route, Some(&body)).await;
            result.map_err(|e| {
                map_error(
                    e,
                    format!("create ref {}", ref_name),
                    repo_not_found(owner, repo),
                )
            })
        })
        .await?;
        Ok(())
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Pull, GitHubError> {
        let route = format!("/repos/{}/{}/pulls/{}", owner, repo, number);
        let pull = retry_rate_limited(|| async {
            let result: Result<PullItem, octocrab::Error> =
                self.octocrab.get(&route, None::<&()>).await;
            result.map_err(|e| {
                map_error(e, format!("get pull request #{}", number), || {
                    GitHubError::RefNotFound {
                        reference: format!("#{}", number),
                    }
                })
            })
        })
        .await?;
        Ok(Pull::from(pull))
    }

    async fn list_pull_request_commits(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<RepoCommit>, GitHubError> {
        let route = format!("/repos/{}/{}/pulls/{}/commits", owner, repo, number);
        let mut commits = Vec::new();
        let mut page = 1u32;

        loop {
            let params = PageParams {
                per_page: LIST_PAGE_SIZE,
                page,
            };
            let listing = retry_rate_limited(|| async {
                let result: Result<Page<CommitItem>, octocrab::Error> =
                    self.octocrab.get(&route, Some(&params)).await;
                result.map_err(|e| {
                    map_error(
                        e,
                        format!("list commits of pull request #{}", number),
                        || GitHubError::RefNotFound {
                            reference: format!("#{}", number),
                        },
                    )
                })
            })
            .await?;

            let has_next_page = listing.next.is_some();
            commits.extend(listing.items.into_iter().map(RepoCommit::from));

            if !has_next_page {
                break;
            }
            page += 1;
        }

        Ok(commits)
    }
}
