//! Pinecone REST client: hosted embeddings, index management (control plane),
//! and query / upsert / stats against one index (data plane).
//!
//! Shared by the API's live `JobIndex` and the offline ingestion job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::search::{rank, JobIndex, SearchError, SearchResult};

pub const PINECONE_CONTROL_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2025-01";

/// How the embedding model should treat its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Query,
    Passage,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    parameters: EmbedParameters,
    inputs: Vec<EmbedInput<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedParameters {
    input_type: InputType,
    truncate: &'static str,
}

#[derive(Debug, Serialize)]
struct EmbedInput<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    data: Vec<Embedding>,
}

#[derive(Debug, Deserialize)]
struct Embedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_values: bool,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Option<Map<String, Value>>,
}

/// A vector as stored in the index.
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    pub total_vector_count: u64,
    #[serde(default)]
    pub namespaces: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: Option<usize>,
    pub host: String,
    pub status: IndexStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexStatus {
    pub ready: bool,
    pub state: Option<String>,
}

/// Serverless index definition for `create_index`.
#[derive(Debug, Serialize)]
pub struct CreateIndex<'a> {
    pub name: &'a str,
    pub dimension: usize,
    pub metric: &'a str,
    pub spec: IndexSpec<'a>,
}

#[derive(Debug, Serialize)]
pub struct IndexSpec<'a> {
    pub serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
pub struct ServerlessSpec<'a> {
    pub cloud: &'a str,
    pub region: &'a str,
}

impl<'a> CreateIndex<'a> {
    /// Cosine-metric serverless index in aws/us-east-1.
    pub fn serverless(name: &'a str, dimension: usize) -> Self {
        CreateIndex {
            name,
            dimension,
            metric: "cosine",
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: "aws",
                    region: "us-east-1",
                },
            },
        }
    }
}

/// Control-plane and inference client.
#[derive(Clone)]
pub struct PineconeClient {
    client: Client,
    control_url: String,
}

impl PineconeClient {
    pub fn new(api_key: &str, control_url: &str, timeout: Duration) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(api_key.trim())
                .map_err(|_| SearchError::Index("invalid Pinecone API key".to_string()))?,
        );
        headers.insert("X-Pinecone-API-Version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            control_url: control_url.trim_end_matches('/').to_string(),
        })
    }

    /// Data-plane handle for the index served at `host`.
    pub fn index(&self, host: &str) -> PineconeIndex {
        PineconeIndex {
            client: self.client.clone(),
            base_url: data_plane_url(host),
        }
    }

    /// Uses the configured host if there is one, otherwise asks the control
    /// plane where `name` lives.
    pub async fn resolve_index(
        &self,
        name: &str,
        configured_host: Option<&str>,
    ) -> Result<PineconeIndex, SearchError> {
        if let Some(host) = configured_host {
            return Ok(self.index(host));
        }
        let description = self
            .describe_index(name)
            .await?
            .ok_or_else(|| SearchError::Index(format!("index '{name}' does not exist")))?;
        info!("Resolved Pinecone index '{name}' at {}", description.host);
        Ok(self.index(&description.host))
    }

    /// `None` when the index does not exist.
    pub async fn describe_index(&self, name: &str) -> Result<Option<IndexDescription>, SearchError> {
        let url = format!("{}/indexes/{name}", self.control_url);
        match send_json::<IndexDescription>(self.client.get(&url)).await {
            Ok(description) => Ok(Some(description)),
            Err(SearchError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn delete_index(&self, name: &str) -> Result<(), SearchError> {
        let url = format!("{}/indexes/{name}", self.control_url);
        send_empty(self.client.delete(&url)).await
    }

    pub async fn create_index(&self, spec: &CreateIndex<'_>) -> Result<(), SearchError> {
        let url = format!("{}/indexes", self.control_url);
        send_empty(self.client.post(&url).json(spec)).await
    }

    /// Polls `describe_index` every `interval` until the index reports ready.
    pub async fn wait_until_ready(
        &self,
        name: &str,
        interval: Duration,
        max_polls: usize,
    ) -> Result<IndexDescription, SearchError> {
        for attempt in 1..=max_polls {
            match self.describe_index(name).await? {
                Some(description) if description.status.ready => return Ok(description),
                Some(description) => debug!(
                    "Index '{name}' not ready (state={:?}, poll {attempt}/{max_polls})",
                    description.status.state
                ),
                None => debug!("Index '{name}' not visible yet (poll {attempt}/{max_polls})"),
            }
            tokio::time::sleep(interval).await;
        }
        Err(SearchError::Index(format!(
            "index '{name}' not ready after {max_polls} polls"
        )))
    }

    /// Deletion is asynchronous: the index stays visible while it terminates
    /// and its name cannot be reused until `describe_index` stops finding it.
    pub async fn wait_until_deleted(
        &self,
        name: &str,
        interval: Duration,
        max_polls: usize,
    ) -> Result<(), SearchError> {
        for attempt in 1..=max_polls {
            match self.describe_index(name).await? {
                None => return Ok(()),
                Some(description) => debug!(
                    "Index '{name}' still present (state={:?}, poll {attempt}/{max_polls})",
                    description.status.state
                ),
            }
            tokio::time::sleep(interval).await;
        }
        Err(SearchError::Index(format!(
            "index '{name}' still present after {max_polls} polls"
        )))
    }

    /// Embeds `inputs` with a Pinecone-hosted model, one vector per input.
    pub async fn embed(
        &self,
        model: &str,
        inputs: &[String],
        input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, SearchError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embed", self.control_url);
        let body = EmbedRequest {
            model,
            parameters: EmbedParameters {
                input_type,
                truncate: "END",
            },
            inputs: inputs.iter().map(|text| EmbedInput { text }).collect(),
        };

        let response: EmbedResponse = send_json(self.client.post(&url).json(&body)).await?;
        if response.data.len() != inputs.len() {
            return Err(SearchError::Embedding(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                response.data.len()
            )));
        }
        if response.data.iter().any(|e| e.values.is_empty()) {
            return Err(SearchError::Embedding("received an empty vector".to_string()));
        }

        Ok(response.data.into_iter().map(|e| e.values).collect())
    }
}

/// Data-plane client bound to one index host.
#[derive(Clone)]
pub struct PineconeIndex {
    client: Client,
    base_url: String,
}

impl PineconeIndex {
    /// Nearest neighbours with metadata, without the stored vectors.
    pub async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, SearchError> {
        let url = format!("{}/query", self.base_url);
        let body = QueryRequest {
            namespace,
            vector,
            top_k,
            include_values: false,
            include_metadata: true,
        };
        let response: QueryResponse = send_json(self.client.post(&url).json(&body)).await?;
        Ok(response.matches)
    }

    pub async fn upsert(&self, namespace: &str, vectors: &[VectorRecord]) -> Result<usize, SearchError> {
        let url = format!("{}/vectors/upsert", self.base_url);
        let body = UpsertRequest { vectors, namespace };
        let response: UpsertResponse = send_json(self.client.post(&url).json(&body)).await?;
        Ok(response.upserted_count)
    }

    pub async fn describe_stats(&self) -> Result<IndexStats, SearchError> {
        let url = format!("{}/describe_index_stats", self.base_url);
        send_json(self.client.post(&url).json(&serde_json::json!({}))).await
    }
}

/// The live `JobIndex`: hosted embedding followed by a nearest-neighbour query.
pub struct PineconeJobIndex {
    client: PineconeClient,
    index: PineconeIndex,
    embed_model: String,
}

impl PineconeJobIndex {
    pub fn new(client: PineconeClient, index: PineconeIndex, embed_model: String) -> Self {
        Self {
            client,
            index,
            embed_model,
        }
    }
}

#[async_trait]
impl JobIndex for PineconeJobIndex {
    async fn search(
        &self,
        query: &str,
        namespace: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let vector = self
            .client
            .embed(&self.embed_model, &[query.to_string()], InputType::Query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::Embedding("no embedding returned".to_string()))?;

        let matches = self.index.query(namespace, &vector, top_k).await?;
        debug!("Pinecone returned {} matches in '{namespace}'", matches.len());

        let results = matches
            .into_iter()
            .map(|m| SearchResult::from_metadata(m.score, m.metadata.as_ref()))
            .collect();
        Ok(rank(results, top_k))
    }
}

/// Index hosts come back from the control plane without a scheme.
fn data_plane_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, SearchError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(api_error(status, &body));
    }
    serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))
}

async fn send_empty(request: RequestBuilder) -> Result<(), SearchError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(api_error(status, &body));
    }
    Ok(())
}

/// Control-plane errors nest the message under `error`; data-plane errors
/// carry it at the top level.
fn api_error(status: StatusCode, body: &str) -> SearchError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string());
    SearchError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_mock;
    use axum::{
        extract::{Path, State},
        http::{HeaderMap as AxumHeaders, StatusCode as AxumStatus},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn client(base: &str) -> PineconeClient {
        PineconeClient::new("pc-key", base, Duration::from_secs(5)).unwrap()
    }

    fn authorized(headers: &AxumHeaders) -> bool {
        headers.get("api-key").map(|v| v == "pc-key").unwrap_or(false)
            && headers.get("x-pinecone-api-version").is_some()
    }

    async fn embed(headers: AxumHeaders, Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
        if !authorized(&headers) {
            return (AxumStatus::UNAUTHORIZED, Json(json!({"error": {"message": "bad key"}})));
        }
        let count = body["inputs"].as_array().map(|a| a.len()).unwrap_or(0);
        let data: Vec<Value> = (0..count)
            .map(|i| json!({"values": [i as f32, 0.5, 0.25], "vector_type": "dense"}))
            .collect();
        (AxumStatus::OK, Json(json!({"model": body["model"], "data": data})))
    }

    async fn query(Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
        if body["includeValues"] != json!(false) || body["includeMetadata"] != json!(true) {
            return (AxumStatus::BAD_REQUEST, Json(json!({"code": 3, "message": "bad flags"})));
        }
        if body["namespace"] == json!("broken") {
            return (AxumStatus::BAD_REQUEST, Json(json!({"code": 3, "message": "namespace broken"})));
        }
        (
            AxumStatus::OK,
            Json(json!({
                "namespace": body["namespace"],
                "matches": [
                    {"id": "b", "score": 0.41, "metadata": {"job_title": "Analyst"}},
                    {"id": "a", "score": 0.93, "metadata": {
                        "job_title": "Rust Engineer", "company_name": "Ferrous",
                        "base_salary": "$150,000/year", "country_code": "US",
                        "job_summary": "Build storage engines."
                    }},
                    {"id": "c", "score": 0.66}
                ]
            })),
        )
    }

    fn data_plane() -> Router {
        Router::new()
            .route("/embed", post(embed))
            .route("/query", post(query))
            .route(
                "/vectors/upsert",
                post(|Json(body): Json<Value>| async move {
                    let n = body["vectors"].as_array().map(|a| a.len()).unwrap_or(0);
                    Json(json!({"upsertedCount": n}))
                }),
            )
            .route(
                "/describe_index_stats",
                post(|| async {
                    Json(json!({
                        "namespaces": {"ns1": {"vectorCount": 4}},
                        "dimension": 3,
                        "totalVectorCount": 4
                    }))
                }),
            )
    }

    #[test]
    fn test_data_plane_url_adds_scheme() {
        assert_eq!(data_plane_url("vecdb-x.svc.pinecone.io"), "https://vecdb-x.svc.pinecone.io");
        assert_eq!(data_plane_url("http://127.0.0.1:9/"), "http://127.0.0.1:9");
    }

    #[test]
    fn test_api_error_reads_both_error_shapes() {
        let control = api_error(StatusCode::NOT_FOUND, r#"{"error":{"code":"NOT_FOUND","message":"missing"},"status":404}"#);
        assert!(matches!(control, SearchError::Api { status: 404, ref message } if message == "missing"));

        let data = api_error(StatusCode::BAD_REQUEST, r#"{"code":3,"message":"bad vector"}"#);
        assert!(matches!(data, SearchError::Api { status: 400, ref message } if message == "bad vector"));

        let raw = api_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(raw, SearchError::Api { status: 502, ref message } if message == "upstream down"));
    }

    #[tokio::test]
    async fn test_search_embeds_queries_and_ranks() {
        let base = spawn_mock(data_plane()).await;
        let pinecone = client(&base);
        let jobs = PineconeJobIndex::new(
            pinecone.clone(),
            pinecone.index(&base),
            "multilingual-e5-large".to_string(),
        );

        let results = jobs.search("rust storage", "ns1", 10).await.unwrap();
        let scores: Vec<f32> = results.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![0.93, 0.66, 0.41]);
        assert_eq!(results[0].company_name, "Ferrous");
        assert_eq!(results[1].job_title, "N/A");
        assert_eq!(results[1].job_summary, "No description available.");
        assert_eq!(results[2].job_title, "Analyst");

        let top_one = jobs.search("rust storage", "ns1", 1).await.unwrap();
        assert_eq!(top_one.len(), 1);
    }

    #[tokio::test]
    async fn test_search_backend_failure_is_error() {
        let base = spawn_mock(data_plane()).await;
        let pinecone = client(&base);
        let jobs = PineconeJobIndex::new(pinecone.clone(), pinecone.index(&base), "m".into());

        let err = jobs.search("q", "broken", 10).await.unwrap_err();
        assert!(matches!(err, SearchError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_embed_rejects_bad_key() {
        let base = spawn_mock(data_plane()).await;
        let wrong = PineconeClient::new("other", &base, Duration::from_secs(5)).unwrap();
        let err = wrong
            .embed("m", &["text".to_string()], InputType::Passage)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Api { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_upsert_and_stats() {
        let base = spawn_mock(data_plane()).await;
        let index = client(&base).index(&base);
        let vectors = vec![
            VectorRecord { id: "1".into(), values: vec![0.1, 0.2, 0.3], metadata: Map::new() },
            VectorRecord { id: "2".into(), values: vec![0.3, 0.2, 0.1], metadata: Map::new() },
        ];
        assert_eq!(index.upsert("ns1", &vectors).await.unwrap(), 2);

        let stats = index.describe_stats().await.unwrap();
        assert_eq!(stats.total_vector_count, 4);
        assert_eq!(stats.dimension, Some(3));
    }

    #[tokio::test]
    async fn test_describe_missing_index_is_none_and_resolve_fails() {
        let base = spawn_mock(Router::new()).await;
        let pinecone = client(&base);
        assert!(pinecone.describe_index("vecdb").await.unwrap().is_none());
        assert!(matches!(
            pinecone.resolve_index("vecdb", None).await,
            Err(SearchError::Index(_))
        ));
    }

    #[tokio::test]
    async fn test_wait_until_ready_polls() {
        let polls = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/indexes/:name",
                get(
                    |State(polls): State<Arc<AtomicUsize>>, Path(name): Path<String>| async move {
                        let ready = polls.fetch_add(1, Ordering::SeqCst) >= 2;
                        let state = if ready { "Ready" } else { "Initializing" };
                        Json(json!({
                            "name": name,
                            "dimension": 1024,
                            "host": "vecdb-abc.svc.pinecone.io",
                            "status": {"ready": ready, "state": state}
                        }))
                    },
                ),
            )
            .with_state(polls.clone());
        let base = spawn_mock(router).await;

        let description = client(&base)
            .wait_until_ready("vecdb", Duration::from_millis(10), 10)
            .await
            .unwrap();
        assert!(description.status.ready);
        assert_eq!(description.host, "vecdb-abc.svc.pinecone.io");
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }
}
