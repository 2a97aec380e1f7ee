use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use repo2resume_api::config::{require_env, PineconeSettings};
use repo2resume_api::ingest::{ingest, load_job_file, IngestOptions, DEFAULT_POLL_INTERVAL};
use repo2resume_api::logging;
use repo2resume_api::search::pinecone::PINECONE_CONTROL_URL;
use repo2resume_api::search::{PineconeClient, JOB_NAMESPACE};

#[derive(Parser)]
#[command(name = "ingest")]
#[command(about = "Embed job listings and load them into the Pinecone index")]
struct IngestCli {
    /// Newline-delimited JSON job records
    #[arg(long, default_value = "Job.json")]
    file: PathBuf,

    #[arg(long, default_value = JOB_NAMESPACE)]
    namespace: String,

    /// Delete and recreate the index before loading
    #[arg(long)]
    recreate: bool,

    /// Records per embed/upsert request
    #[arg(long, default_value_t = 96)]
    batch_size: usize,

    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = IngestCli::parse();
    logging::init("ingest", &cli.log_level);

    let api_key = require_env("PINECONE_API_KEY")?;
    let settings = PineconeSettings::from_env()?;

    let corpus = load_job_file(&cli.file)?;
    info!(
        "Loaded {} job records from {} ({} skipped)",
        corpus.records.len(),
        cli.file.display(),
        corpus.skipped
    );

    let client = PineconeClient::new(
        &api_key,
        PINECONE_CONTROL_URL,
        std::time::Duration::from_secs(cli.timeout_secs),
    )
    .context("building Pinecone client")?;

    let options = IngestOptions {
        namespace: cli.namespace,
        batch_size: cli.batch_size,
        recreate: cli.recreate,
        poll_interval: DEFAULT_POLL_INTERVAL,
    };
    let report = ingest(&client, &settings, &corpus, &options)
        .await
        .with_context(|| format!("ingesting into index '{}'", settings.index_name))?;

    info!(
        "Successfully upserted {} vectors into '{}' ({} records skipped, {} vectors in index)",
        report.upserted, settings.index_name, report.skipped, report.total_vectors
    );
    Ok(())
}
