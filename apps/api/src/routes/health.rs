use axum::Json;
use serde_json::{json, Value};

/// GET /
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "message": "REPO2RESUME API is running" }))
}
