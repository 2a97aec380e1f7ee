//! Fixed repository data served in local-testing mode.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::repo_data::{LanguageShare, RepoInfo, RepoSource, UpstreamError};

pub const SAMPLE_DESCRIPTION: &str =
    "A hackathon project to automate resume creation from GitHub repositories.";
pub const SAMPLE_TOPICS: [&str; 3] = ["fastapi", "github-api", "resume-automation"];
pub const SAMPLE_FILES: [&str; 4] = ["main.py", "README.md", "requirements.txt", "utils.py"];
pub const SAMPLE_README: &str = "This is a sample README for the TruHacks project.";
pub const SAMPLE_COMMITS: [&str; 4] = [
    "Initial commit",
    "Added FastAPI backend",
    "Integrated GitHub API",
    "Updated README",
];
pub const SAMPLE_CREATED_AT: &str = "2023-01-01T00:00:00Z";
pub const SAMPLE_PUSHED_AT: &str = "2023-12-31T23:59:59Z";

/// Serves the same sample repository for every owner/repo pair; only the
/// repository name echoes the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedRepoSource;

#[async_trait]
impl RepoSource for CannedRepoSource {
    async fn fetch_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo, UpstreamError> {
        info!("Using sample response for {owner}/{repo} (local testing)");
        Ok(RepoInfo {
            name: Some(repo.to_string()),
            description: Some(SAMPLE_DESCRIPTION.to_string()),
            topics: SAMPLE_TOPICS.iter().map(|t| t.to_string()).collect(),
            created_at: SAMPLE_CREATED_AT.parse::<DateTime<Utc>>().ok(),
            pushed_at: SAMPLE_PUSHED_AT.parse::<DateTime<Utc>>().ok(),
        })
    }

    async fn fetch_repo_files(&self, owner: &str, repo: &str, _path: &str) -> Vec<String> {
        info!("Using sample files for {owner}/{repo} (local testing)");
        SAMPLE_FILES.iter().map(|f| f.to_string()).collect()
    }

    async fn fetch_repo_languages(&self, owner: &str, repo: &str) -> Vec<LanguageShare> {
        info!("Using sample languages for {owner}/{repo} (local testing)");
        vec![
            LanguageShare {
                language: "Python".to_string(),
                percent: 80.0,
            },
            LanguageShare {
                language: "JavaScript".to_string(),
                percent: 20.0,
            },
        ]
    }

    async fn fetch_readme(&self, owner: &str, repo: &str) -> String {
        info!("Using sample README for {owner}/{repo} (local testing)");
        SAMPLE_README.to_string()
    }

    /// The limit is ignored; the sample history is always served whole.
    async fn fetch_commit_messages(&self, owner: &str, repo: &str, _limit: usize) -> Vec<String> {
        info!("Using sample commits for {owner}/{repo} (local testing)");
        SAMPLE_COMMITS.iter().map(|c| c.to_string()).collect()
    }
}
