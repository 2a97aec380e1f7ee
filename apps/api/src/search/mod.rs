//! Semantic job search over the job-listing corpus.
//!
//! `JobIndex` is the seam: `PineconeJobIndex` embeds the query and asks
//! Pinecone for nearest neighbours, `CannedJobIndex` returns four fixed
//! listings for local testing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub mod canned;
pub mod handlers;
pub mod pinecone;

pub use canned::CannedJobIndex;
pub use pinecone::{PineconeClient, PineconeJobIndex};

/// Namespace holding the job-listing corpus.
pub const JOB_NAMESPACE: &str = "ns1";
pub const DEFAULT_TOP_K: usize = 10;

const MISSING_FIELD: &str = "N/A";
const MISSING_SUMMARY: &str = "No description available.";

/// Vector-database and embedding failures.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Pinecone API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("could not decode Pinecone response: {0}")]
    Decode(String),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("index error: {0}")]
    Index(String),
}

/// One ranked job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub score: f32,
    pub job_title: String,
    pub company_name: String,
    pub base_salary: String,
    pub country_code: String,
    pub job_summary: String,
}

impl SearchResult {
    /// Builds a result from vector metadata, defaulting any absent field.
    /// Numeric metadata (a salary stored as a number, say) is rendered as text.
    pub fn from_metadata(score: f32, metadata: Option<&Map<String, Value>>) -> Self {
        let field = |key: &str, default: &str| -> String {
            metadata
                .and_then(|m| m.get(key))
                .and_then(|v| match v {
                    Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .unwrap_or_else(|| default.to_string())
        };

        SearchResult {
            score,
            job_title: field("job_title", MISSING_FIELD),
            company_name: field("company_name", MISSING_FIELD),
            base_salary: field("base_salary", MISSING_FIELD),
            country_code: field("country_code", MISSING_FIELD),
            job_summary: field("job_summary", MISSING_SUMMARY),
        }
    }
}

/// Orders results by non-increasing score and keeps at most `top_k`.
pub fn rank(mut results: Vec<SearchResult>, top_k: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_k);
    results
}

#[async_trait]
pub trait JobIndex: Send + Sync {
    async fn search(
        &self,
        query: &str,
        namespace: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, SearchError>;
}
