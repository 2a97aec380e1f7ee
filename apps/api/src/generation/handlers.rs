//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::cover_letter::{generate_cover_letter, CoverLetterRequest};
use crate::generation::star::{generate_star_section, STAR_COMPONENTS};
use crate::repo_data::aggregate_repo_data;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubProjectRequest {
    pub owner: String,
    pub repo: String,
    /// Lowers the configured commit limit for this request; never raises it.
    pub commit_limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubProjectResponse {
    pub repo_name: String,
    pub date: String,
    pub descriptions: [String; STAR_COMPONENTS],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/github-project
///
/// Aggregates the repository, then asks the model for a STAR section.
pub async fn handle_github_project(
    State(state): State<AppState>,
    Json(request): Json<GithubProjectRequest>,
) -> Result<Json<GithubProjectResponse>, AppError> {
    let owner = request.owner.trim();
    let repo = request.repo.trim();
    validate_github_name("owner", owner)?;
    validate_github_name("repo", repo)?;

    info!("Fetching data for owner: {owner}, repo: {repo}");
    let commit_limit = request
        .commit_limit
        .map_or(state.commit_limit, |limit| limit.min(state.commit_limit));

    let record = aggregate_repo_data(state.repos.as_ref(), owner, repo, commit_limit)
        .await
        .map_err(|e| AppError::from_repo_fetch(e, owner, repo))?;

    let section = generate_star_section(state.llm.as_ref(), &record).await?;

    info!("Successfully generated resume section for {owner}/{repo}");
    Ok(Json(GithubProjectResponse {
        repo_name: section.name,
        date: section.date,
        descriptions: section.descriptions,
    }))
}

/// POST /api/generate-cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    info!("Received cover letter request for: {}", request.full_name);

    let cover_letter = generate_cover_letter(state.llm.as_ref(), &request).await?;

    Ok(Json(CoverLetterResponse { cover_letter }))
}

/// GitHub owner and repository names: ASCII letters, digits, `-`, `_` and `.`.
fn validate_github_name(field: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
    if !value.chars().all(allowed) || value == "." || value == ".." {
        return Err(AppError::Validation(format!(
            "{field} is not a valid GitHub name"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo_data::{CannedRepoSource, LanguageShare, RepoInfo, RepoSource, UpstreamError};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Canned data, remembering the commit limit each call asked for.
    #[derive(Default)]
    struct LimitRecorder(Mutex<Vec<usize>>);

    #[async_trait]
    impl RepoSource for LimitRecorder {
        async fn fetch_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo, UpstreamError> {
            CannedRepoSource.fetch_repo_info(owner, repo).await
        }
        async fn fetch_repo_files(&self, owner: &str, repo: &str, path: &str) -> Vec<String> {
            CannedRepoSource.fetch_repo_files(owner, repo, path).await
        }
        async fn fetch_repo_languages(&self, owner: &str, repo: &str) -> Vec<LanguageShare> {
            CannedRepoSource.fetch_repo_languages(owner, repo).await
        }
        async fn fetch_readme(&self, owner: &str, repo: &str) -> String {
            CannedRepoSource.fetch_readme(owner, repo).await
        }
        async fn fetch_commit_messages(&self, owner: &str, repo: &str, limit: usize) -> Vec<String> {
            self.0.lock().unwrap().push(limit);
            CannedRepoSource.fetch_commit_messages(owner, repo, limit).await
        }
    }

    async fn limit_used(configured: usize, requested: Option<usize>) -> usize {
        let recorder = Arc::new(LimitRecorder::default());
        let mut state = AppState::local_testing(configured);
        state.repos = recorder.clone();

        let request = GithubProjectRequest {
            owner: "x".to_string(),
            repo: "y".to_string(),
            commit_limit: requested,
        };
        handle_github_project(State(state), Json(request)).await.unwrap();

        let limits = recorder.0.lock().unwrap().clone();
        assert_eq!(limits.len(), 1);
        limits[0]
    }

    #[tokio::test]
    async fn test_commit_limit_is_capped_by_configuration() {
        assert_eq!(limit_used(100, None).await, 100);
        assert_eq!(limit_used(100, Some(20)).await, 20);
        assert_eq!(limit_used(100, Some(1_000_000)).await, 100);
    }

    #[test]
    fn test_validate_github_name() {
        assert!(validate_github_name("owner", "rust-lang").is_ok());
        assert!(validate_github_name("repo", "repo_2.resume").is_ok());
        assert!(validate_github_name("owner", "").is_err());
        assert!(validate_github_name("repo", "..").is_err());
        assert!(validate_github_name("repo", "a/b").is_err());
        assert!(validate_github_name("owner", "Aditya Shah").is_err());
    }

    #[test]
    fn test_request_commit_limit_is_optional() {
        let parsed: GithubProjectRequest =
            serde_json::from_value(serde_json::json!({"owner": "x", "repo": "y"})).unwrap();
        assert!(parsed.commit_limit.is_none());

        let parsed: GithubProjectRequest = serde_json::from_value(
            serde_json::json!({"owner": "x", "repo": "y", "commitLimit": 20}),
        )
        .unwrap();
        assert_eq!(parsed.commit_limit, Some(20));
    }
}
