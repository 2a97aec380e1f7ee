//! Offline job-corpus ingestion: newline-delimited JSON job records are
//! embedded with the Pinecone-hosted model and upserted into the index the
//! search route queries. Runs as its own binary; the service only ever sees
//! the persisted index.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::PineconeSettings;
use crate::search::pinecone::{CreateIndex, InputType, PineconeClient, VectorRecord};
use crate::search::SearchError;

/// Pause between control-plane polls while an index is created or deleted.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_POLLS: usize = 300;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no valid job records to ingest")]
    Empty,

    #[error("embedding width {found} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// One job listing as stored in the index; `metadata` is kept whole.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub id: String,
    pub summary: String,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Default)]
pub struct JobCorpus {
    pub records: Vec<JobRecord>,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub namespace: String,
    pub batch_size: usize,
    pub recreate: bool,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub upserted: usize,
    pub skipped: usize,
    pub total_vectors: u64,
}

pub fn load_job_file(path: &Path) -> Result<JobCorpus, IngestError> {
    let contents = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_job_lines(&contents))
}

/// Parses one record per line. Blank lines are ignored; malformed lines and
/// records without an id or `metadata.job_summary` are logged and counted.
pub fn parse_job_lines(contents: &str) -> JobCorpus {
    let mut corpus = JobCorpus::default();

    for (index, line) in contents.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!("Line {line_no}: invalid JSON, skipping: {e}");
                corpus.skipped += 1;
                continue;
            }
        };

        match job_record(&value) {
            Some(record) => corpus.records.push(record),
            None => {
                warn!("Line {line_no}: missing id or metadata.job_summary, skipping");
                corpus.skipped += 1;
            }
        }
    }

    corpus
}

fn job_record(value: &Value) -> Option<JobRecord> {
    let id = match value.get("id")? {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let metadata = value.get("metadata")?.as_object()?.clone();
    let summary = metadata
        .get("job_summary")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())?
        .to_string();

    Some(JobRecord {
        id,
        summary,
        metadata,
    })
}

/// Prepares the index, embeds and upserts `corpus` in batches, and reports
/// the index's vector count afterwards.
pub async fn ingest(
    client: &PineconeClient,
    settings: &PineconeSettings,
    corpus: &JobCorpus,
    options: &IngestOptions,
) -> Result<IngestReport, IngestError> {
    if corpus.records.is_empty() {
        return Err(IngestError::Empty);
    }

    prepare_index(client, settings, options).await?;
    let description = client
        .wait_until_ready(&settings.index_name, options.poll_interval, MAX_POLLS)
        .await?;
    let host = settings
        .index_host
        .as_deref()
        .unwrap_or(description.host.as_str());
    let index = client.index(host);
    info!("Index '{}' ready at {host}", settings.index_name);

    let mut upserted = 0;
    for batch in corpus.records.chunks(options.batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|r| r.summary.clone()).collect();
        let embeddings = client
            .embed(&settings.embed_model, &texts, InputType::Passage)
            .await?;

        let vectors = batch
            .iter()
            .zip(embeddings)
            .map(|(record, values)| {
                if values.len() != settings.dimension {
                    return Err(IngestError::DimensionMismatch {
                        expected: settings.dimension,
                        found: values.len(),
                    });
                }
                Ok(VectorRecord {
                    id: record.id.clone(),
                    values,
                    metadata: record.metadata.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        upserted += index.upsert(&options.namespace, &vectors).await?;
        info!("Upserted {upserted}/{} vectors", corpus.records.len());
    }

    let stats = index.describe_stats().await?;
    let namespaces = Value::Object(stats.namespaces.clone());
    info!(
        "Index stats: {} vectors total, dimension {:?}, namespaces {namespaces}",
        stats.total_vector_count, stats.dimension
    );

    Ok(IngestReport {
        upserted,
        skipped: corpus.skipped,
        total_vectors: stats.total_vector_count,
    })
}

async fn prepare_index(
    client: &PineconeClient,
    settings: &PineconeSettings,
    options: &IngestOptions,
) -> Result<(), IngestError> {
    let name = settings.index_name.as_str();
    let existing = client.describe_index(name).await?;

    match existing {
        Some(_) if options.recreate => {
            info!("Deleting existing index '{name}'");
            client.delete_index(name).await?;
            client
                .wait_until_deleted(name, options.poll_interval, MAX_POLLS)
                .await?;
        }
        Some(description) => {
            if let Some(found) = description.dimension {
                if found != settings.dimension {
                    return Err(IngestError::DimensionMismatch {
                        expected: settings.dimension,
                        found,
                    });
                }
            }
            return Ok(());
        }
        None => {}
    }

    info!(
        "Creating index '{name}' (dimension {}, cosine)",
        settings.dimension
    );
    client
        .create_index(&CreateIndex::serverless(name, settings.dimension))
        .await?;
    Ok(())
}
