//! Repository data: everything the service learns about a GitHub repository.
//!
//! `RepoSource` is the seam between aggregation and the network:
//! `GithubClient` talks to the REST API, `CannedRepoSource` serves fixed
//! sample data for local testing. Only `fetch_repo_info` can fail; every
//! other fetch degrades to an empty value or the README sentinel and logs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub mod aggregate;
pub mod canned;
pub mod commits;
pub mod github;

pub use aggregate::{aggregate_repo_data, AggregateRepoRecord};
pub use canned::CannedRepoSource;
pub use github::GithubClient;

/// Returned by `fetch_readme` when a repository has no readable README.
pub const NO_README: &str = "No README available.";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("resource not found on source host")]
    NotFound,

    #[error("source host returned status {status}")]
    Unavailable { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not decode source host response: {0}")]
    Decode(String),

    #[error("invalid source host URL: {0}")]
    InvalidUrl(String),
}

/// Top-level repository metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub topics: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Share of the repository's bytes written in one language, in percent
/// rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    pub language: String,
    pub percent: f64,
}

#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn fetch_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo, UpstreamError>;

    /// Every file path under `path`, walking directories recursively.
    async fn fetch_repo_files(&self, owner: &str, repo: &str, path: &str) -> Vec<String>;

    /// Language shares ordered by descending percentage.
    async fn fetch_repo_languages(&self, owner: &str, repo: &str) -> Vec<LanguageShare>;

    async fn fetch_readme(&self, owner: &str, repo: &str) -> String;

    /// At most `limit` commit messages, most recent first.
    async fn fetch_commit_messages(&self, owner: &str, repo: &str, limit: usize) -> Vec<String>;
}

/// Converts per-language byte counts into percentage shares.
///
/// Shares are rounded to two decimals and ordered by descending share, then
/// name. Returns nothing when the repository reports no bytes at all.
pub fn language_percentages<'a, I>(byte_counts: I) -> Vec<LanguageShare>
where
    I: IntoIterator<Item = (&'a String, &'a u64)>,
{
    let counts: Vec<(&String, u64)> = byte_counts.into_iter().map(|(l, b)| (l, *b)).collect();
    let total: u64 = counts.iter().map(|(_, b)| b).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<LanguageShare> = counts
        .into_iter()
        .map(|(language, bytes)| LanguageShare {
            language: language.clone(),
            percent: (bytes as f64 / total as f64 * 10_000.0).round() / 100.0,
        })
        .collect();
    shares.sort_by(|a, b| {
        b.percent
            .total_cmp(&a.percent)
            .then_with(|| a.language.cmp(&b.language))
    });
    shares
}
