//! Merges the individual repository fetches into one record.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::repo_data::{LanguageShare, RepoSource, UpstreamError};

const UNKNOWN_NAME: &str = "Unknown Repository";
const NO_DESCRIPTION: &str = "No description available.";
const UNKNOWN_START: &str = "Unknown Start Date";
const UNKNOWN_LAST_UPDATED: &str = "Unknown Last Updated";

/// Everything known about one repository, built fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRepoRecord {
    pub name: String,
    pub description: String,
    pub topics: Vec<String>,
    pub languages: Vec<LanguageShare>,
    pub files: Vec<String>,
    pub readme: String,
    pub recent_commit_messages: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
}

impl AggregateRepoRecord {
    /// `"<created> - <last push>"`, with placeholders for unknown ends.
    pub fn date_range(&self) -> String {
        format!(
            "{} - {}",
            format_timestamp(self.created_at, UNKNOWN_START),
            format_timestamp(self.pushed_at, UNKNOWN_LAST_UPDATED)
        )
    }

    pub fn language_names(&self) -> Vec<String> {
        self.languages.iter().map(|l| l.language.clone()).collect()
    }
}

fn format_timestamp(ts: Option<DateTime<Utc>>, fallback: &str) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| fallback.to_string())
}

/// Fetches and merges all repository data.
///
/// Fails only when the repository metadata cannot be fetched. The remaining
/// fetches are independent and run concurrently; each degrades to its own
/// default on failure.
pub async fn aggregate_repo_data(
    source: &dyn RepoSource,
    owner: &str,
    repo: &str,
    commit_limit: usize,
) -> Result<AggregateRepoRecord, UpstreamError> {
    let info = source.fetch_repo_info(owner, repo).await?;

    let (languages, readme, files, recent_commit_messages) = tokio::join!(
        source.fetch_repo_languages(owner, repo),
        source.fetch_readme(owner, repo),
        source.fetch_repo_files(owner, repo, ""),
        source.fetch_commit_messages(owner, repo, commit_limit),
    );

    info!(
        "Aggregated {owner}/{repo}: {} languages, {} files, {} commits",
        languages.len(),
        files.len(),
        recent_commit_messages.len()
    );

    Ok(AggregateRepoRecord {
        name: info.name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        description: info.description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        topics: info.topics,
        languages,
        files,
        readme,
        recent_commit_messages,
        created_at: info.created_at,
        pushed_at: info.pushed_at,
    })
}
