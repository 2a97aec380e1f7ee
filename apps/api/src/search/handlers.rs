//! Axum route handler for job search.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::search::{SearchResult, DEFAULT_TOP_K, JOB_NAMESPACE};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub similar_jobs: Vec<SearchResult>,
}

/// POST /api/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    let similar_jobs = state.jobs.search(query, JOB_NAMESPACE, DEFAULT_TOP_K).await?;

    info!("Job search returned {} results", similar_jobs.len());
    Ok(Json(SearchResponse { similar_jobs }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape() {
        let response = SearchResponse {
            similar_jobs: vec![SearchResult::from_metadata(0.5, None)],
        };
        let json = serde_json::to_value(&response).unwrap();
        let first = &json["similarJobs"][0];
        assert_eq!(first["score"], 0.5);
        assert_eq!(first["job_title"], "N/A");
        assert_eq!(first["job_summary"], "No description available.");
    }
}
