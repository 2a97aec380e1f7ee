use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::GenerationError;
use crate::repo_data::UpstreamError;
use crate::search::SearchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Internal error text is logged here and never sent to the caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Source host error: {0}")]
    Upstream(UpstreamError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

impl AppError {
    /// Maps a failed repository lookup; a 404 from the source host means the
    /// repository does not exist (or is private).
    pub fn from_repo_fetch(err: UpstreamError, owner: &str, repo: &str) -> Self {
        match err {
            UpstreamError::NotFound => AppError::RepoNotFound(format!("{owner}/{repo}")),
            other => AppError::Upstream(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::RepoNotFound(repo) => {
                tracing::warn!("Repository not found: {repo}");
                (
                    StatusCode::NOT_FOUND,
                    "REPO_NOT_FOUND",
                    "Repository not found".to_string(),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Generation(GenerationError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Upstream(e) => {
                tracing::error!("Source host error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    "Failed to fetch repository data".to_string(),
                )
            }
            AppError::Generation(e) => {
                tracing::error!("Generation error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GENERATION_ERROR",
                    "Failed to generate content".to_string(),
                )
            }
            AppError::Search(e) => {
                tracing::error!("Search error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SEARCH_ERROR",
                    "Job search failed".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
