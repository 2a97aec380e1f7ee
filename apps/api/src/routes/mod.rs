pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as generation;
use crate::search::handlers as search;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health_handler))
        .route(
            "/api/github-project",
            post(generation::handle_github_project),
        )
        .route(
            "/api/generate-cover-letter",
            post(generation::handle_cover_letter),
        )
        .route("/api/search", post(search::handle_search))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo_data::canned::{SAMPLE_CREATED_AT, SAMPLE_PUSHED_AT};
    use crate::repo_data::{LanguageShare, RepoInfo, RepoSource, UpstreamError};
    use crate::search::{JobIndex, SearchError, SearchResult};
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct RepoStatus(UpstreamError);

    #[async_trait]
    impl RepoSource for RepoStatus {
        async fn fetch_repo_info(&self, _: &str, _: &str) -> Result<RepoInfo, UpstreamError> {
            Err(match &self.0 {
                UpstreamError::NotFound => UpstreamError::NotFound,
                UpstreamError::Unavailable { status } => UpstreamError::Unavailable { status: *status },
                other => UpstreamError::Decode(other.to_string()),
            })
        }
        async fn fetch_repo_files(&self, _: &str, _: &str, _: &str) -> Vec<String> {
            Vec::new()
        }
        async fn fetch_repo_languages(&self, _: &str, _: &str) -> Vec<LanguageShare> {
            Vec::new()
        }
        async fn fetch_readme(&self, _: &str, _: &str) -> String {
            String::new()
        }
        async fn fetch_commit_messages(&self, _: &str, _: &str, _: usize) -> Vec<String> {
            Vec::new()
        }
    }

    struct BrokenIndex;

    #[async_trait]
    impl JobIndex for BrokenIndex {
        async fn search(&self, _: &str, _: &str, _: usize) -> Result<Vec<SearchResult>, SearchError> {
            Err(SearchError::Api {
                status: 503,
                message: "secret backend detail".to_string(),
            })
        }
    }

    fn local() -> AppState {
        AppState::local_testing(100)
    }

    async fn post_json(state: AppState, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = build_router(local())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "REPO2RESUME API is running");
    }

    #[tokio::test]
    async fn test_github_project_local_testing() {
        let (status, body) =
            post_json(local(), "/api/github-project", json!({"owner": "x", "repo": "y"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["repoName"], "y");

        let date = body["date"].as_str().unwrap();
        assert!(date.contains(SAMPLE_CREATED_AT));
        assert!(date.contains(SAMPLE_PUSHED_AT));

        let descriptions = body["descriptions"].as_array().unwrap();
        assert_eq!(descriptions.len(), 4);
        assert!(descriptions[0].as_str().unwrap().starts_with("Job seekers"));
    }

    #[tokio::test]
    async fn test_github_project_same_record_for_any_repo() {
        let (_, a) = post_json(local(), "/api/github-project", json!({"owner": "a", "repo": "z"})).await;
        let (_, b) = post_json(local(), "/api/github-project", json!({"owner": "b", "repo": "z"})).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_github_project_not_found_is_404() {
        let mut state = local();
        state.repos = Arc::new(RepoStatus(UpstreamError::NotFound));
        let (status, body) =
            post_json(state, "/api/github-project", json!({"owner": "x", "repo": "gone"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "REPO_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_github_project_rate_limited_is_500() {
        let mut state = local();
        state.repos = Arc::new(RepoStatus(UpstreamError::Unavailable { status: 403 }));
        let (status, body) =
            post_json(state, "/api/github-project", json!({"owner": "x", "repo": "y"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_github_project_rejects_bad_owner() {
        let (status, _) =
            post_json(local(), "/api/github-project", json!({"owner": "../etc", "repo": "y"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cover_letter_local_testing() {
        let (status, body) = post_json(
            local(),
            "/api/generate-cover-letter",
            json!({
                "fullName": "Jane Roe",
                "jobTitle": "Engineer",
                "companyName": "Acme",
                "jobDescription": "Build things.",
                "skills": ["Rust"]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["coverLetter"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_local_testing() {
        let (status, body) = post_json(local(), "/api/search", json!({"query": "anything"})).await;
        assert_eq!(status, StatusCode::OK);
        let scores: Vec<f64> = body["similarJobs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|j| j["score"].as_f64().unwrap())
            .collect();
        assert_eq!(scores.len(), 4);
        for (got, want) in scores.iter().zip([0.95, 0.90, 0.88, 0.85]) {
            assert!((got - want).abs() < 1e-6, "{got} vs {want}");
        }
    }

    #[tokio::test]
    async fn test_search_failure_does_not_leak_details() {
        let mut state = local();
        state.jobs = Arc::new(BrokenIndex);
        let (status, body) = post_json(state, "/api/search", json!({"query": "rust"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "SEARCH_ERROR");
        assert!(!body.to_string().contains("secret backend detail"));
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let (status, _) = post_json(local(), "/api/search", json!({"query": "  "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
