//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use octocrab::Octocrab;
use semver_next::OctocrabClient;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER: &str = "willabides";
pub const REPO: &str = "semver-next";

/// Helper to create a client pointing to a mock server.
pub async fn mock_client(server: &MockServer) -> OctocrabClient {
    let octocrab = Octocrab::builder()
        .base_uri(server.uri())
        .expect("Failed to set base URI")
        .build()
        .expect("Failed to build octocrab");
    OctocrabClient::with_client(octocrab)
}

/// A commit as returned by the list-commits endpoint.
pub fn commit_json(sha: &str, message: &str) -> Value {
    json!({
        "sha": sha,
        "url": format!("https://api.github.com/repos/{OWNER}/{REPO}/commits/{sha}"),
        "commit": {
            "message": message,
            "author": { "name": "Test", "email": "test@example.com", "date": "2024-01-01T00:00:00Z" }
        }
    })
}

/// A pull request as returned by the commit pulls endpoint.
pub fn pull_json(number: u64, labels: &[&str], merged: bool) -> Value {
    let labels: Vec<Value> = labels
        .iter()
        .enumerate()
        .map(|(i, name)| json!({ "id": i + 1, "name": name, "color": "fc2929", "default": false }))
        .collect();
    let merged_at = merged.then_some("2024-01-15T00:00:00Z");

    json!({
        "number": number,
        "state": "closed",
        "title": format!("PR {number}"),
        "labels": labels,
        "merged_at": merged_at,
    })
}

/// GitHub's 404 payload.
pub fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "message": "Not Found",
        "documentation_url": "https://docs.github.com/rest"
    }))
}

/// Answer `GET /commits/{reference}` with `sha`.
pub async fn mount_resolve(server: &MockServer, reference: &str, sha: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/commits/{reference}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(commit_json(sha, "")))
        .mount(server)
        .await;
}

/// Answer one page of the commit listing for `head`.
pub async fn mount_commit_page(
    server: &MockServer,
    head: &str,
    page: u32,
    commits: Vec<Value>,
    has_next: bool,
) {
    let mut response = ResponseTemplate::new(200).set_body_json(commits);
    if has_next {
        response = response.insert_header(
            "Link",
            format!(
                "<{}/repos/{OWNER}/{REPO}/commits?sha={head}&per_page=100&page={}>; rel=\"next\"",
                server.uri(),
                page + 1
            )
            .as_str(),
        );
    }

    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/commits")))
        .and(query_param("sha", head))
        .and(query_param("page", page.to_string()))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Answer the pulls lookup for one commit.
pub async fn mount_pulls(server: &MockServer, sha: &str, pulls: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/commits/{sha}/pulls")))
        .respond_with(ResponseTemplate::new(200).set_body_json(pulls))
        .mount(server)
        .await;
}

/// Answer the latest-release lookup.
pub async fn mount_latest_release(server: &MockServer, name: &str, tag: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/releases/latest")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "name": name,
            "tag_name": tag,
            "draft": false,
            "prerelease": false
        })))
        .mount(server)
        .await;
}
