//! GitHub REST client, the live `RepoSource`.
//!
//! One request per call, no retries. A failed sub-fetch is logged and
//! degrades to an empty value; only repository metadata reports errors.

use std::collections::HashMap;
use std::time::Duration;

use async_recursion::async_recursion;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, IntoUrl, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::repo_data::commits::collect_commit_messages;
use crate::repo_data::{language_percentages, LanguageShare, RepoInfo, RepoSource, UpstreamError, NO_README};

/// Pause before descending into a subdirectory, to stay clear of GitHub's
/// secondary rate limits.
const DIR_RECURSION_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: Option<String>,
    description: Option<String>,
    topics: Option<Vec<String>>,
    created_at: Option<DateTime<Utc>>,
    pushed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct FileContent {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
}

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("repo2resume-api"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn repo_url(&self, owner: &str, repo: &str, suffix: &str) -> String {
        format!("{}/repos/{owner}/{repo}{suffix}", self.base_url)
    }

    /// `contents` URL for `path`, each segment percent-encoded so names
    /// containing `#`, `?` or `%` address the entry itself.
    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.repo_url(owner, repo, "/contents"))
            .map_err(|e| UpstreamError::InvalidUrl(e.to_string()))?;
        if !path.is_empty() {
            url.path_segments_mut()
                .map_err(|_| UpstreamError::InvalidUrl(self.base_url.clone()))?
                .extend(path.split('/'));
        }
        Ok(url)
    }

    fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("token {token}")),
            None => request,
        }
    }

    #[async_recursion]
    async fn walk_tree(&self, owner: &str, repo: &str, path: &str) -> Vec<String> {
        let listing: Result<Vec<ContentEntry>, UpstreamError> =
            match self.contents_url(owner, repo, path) {
                Ok(url) => send_json(self.get(url)).await,
                Err(e) => Err(e),
            };
        let entries = match listing {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error fetching files for {owner}/{repo} at path '{path}': {e}");
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            match entry.kind.as_str() {
                "file" => files.push(entry.path),
                "dir" => {
                    tokio::time::sleep(DIR_RECURSION_DELAY).await;
                    files.extend(self.walk_tree(owner, repo, &entry.path).await);
                }
                // symlinks and submodules
                other => debug!("Skipping {} entry {}", other, entry.path),
            }
        }
        files
    }
}

#[async_trait]
impl RepoSource for GithubClient {
    async fn fetch_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo, UpstreamError> {
        let url = self.repo_url(owner, repo, "");
        let data: RepoResponse = send_json(self.get(&url)).await.map_err(|e| {
            error!("Error fetching repo info for {owner}/{repo}: {e}");
            e
        })?;

        Ok(RepoInfo {
            name: data.name,
            description: data.description,
            topics: data.topics.unwrap_or_default(),
            created_at: data.created_at,
            pushed_at: data.pushed_at,
        })
    }

    async fn fetch_repo_files(&self, owner: &str, repo: &str, path: &str) -> Vec<String> {
        self.walk_tree(owner, repo, path).await
    }

    async fn fetch_repo_languages(&self, owner: &str, repo: &str) -> Vec<LanguageShare> {
        let url = self.repo_url(owner, repo, "/languages");
        match send_json::<HashMap<String, u64>>(self.get(&url)).await {
            Ok(bytes) => language_percentages(&bytes),
            Err(e) => {
                error!("Error fetching languages for {owner}/{repo}: {e}");
                Vec::new()
            }
        }
    }

    async fn fetch_readme(&self, owner: &str, repo: &str) -> String {
        let url = self.repo_url(owner, repo, "/contents/README.md");
        match send_json::<FileContent>(self.get(&url)).await {
            Ok(FileContent { content: Some(encoded) }) => decode_readme(&encoded)
                .unwrap_or_else(|| {
                    error!("README for {owner}/{repo} is not valid base64 UTF-8");
                    NO_README.to_string()
                }),
            Ok(FileContent { content: None }) => {
                info!("README for {owner}/{repo} has no inline content");
                NO_README.to_string()
            }
            Err(UpstreamError::NotFound) => {
                info!("README not found for {owner}/{repo}");
                NO_README.to_string()
            }
            Err(e) => {
                error!("Error fetching README for {owner}/{repo}: {e}");
                NO_README.to_string()
            }
        }
    }

    async fn fetch_commit_messages(&self, owner: &str, repo: &str, limit: usize) -> Vec<String> {
        let url = self.repo_url(owner, repo, "/commits");
        collect_commit_messages(limit, |page, per_page| {
            let request = self
                .get(&url)
                .query(&[("per_page", per_page), ("page", page)]);
            async move {
                match send_json::<Vec<CommitEntry>>(request).await {
                    Ok(commits) => Some(commits.into_iter().map(|c| c.commit.message).collect()),
                    Err(e) => {
                        error!("Error fetching commits page {page} for {owner}/{repo}: {e}");
                        None
                    }
                }
            }
        })
        .await
    }
}

/// Sends a GET and decodes a JSON body. Any status other than 2xx is an error.
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, UpstreamError> {
    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(UpstreamError::NotFound);
    }
    if !status.is_success() {
        return Err(UpstreamError::Unavailable {
            status: status.as_u16(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}

/// GitHub wraps base64 content at 60 columns; whitespace is dropped before decoding.
fn decode_readme(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact).ok()?;
    String::from_utf8(bytes).ok()
}
