use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::{BackendMode, Config};
use crate::llm_client::{CannedTextGenerator, GeminiClient, TextGenerator, GEMINI_API_URL};
use crate::repo_data::{CannedRepoSource, GithubClient, RepoSource};
use crate::search::pinecone::PINECONE_CONTROL_URL;
use crate::search::{CannedJobIndex, JobIndex, PineconeClient, PineconeJobIndex};

/// Shared application state injected into all route handlers via Axum extractors.
/// The backends are picked once at startup from `BackendMode`.
#[derive(Clone)]
pub struct AppState {
    pub repos: Arc<dyn RepoSource>,
    pub llm: Arc<dyn TextGenerator>,
    pub jobs: Arc<dyn JobIndex>,
    /// Default number of commit messages gathered per repository.
    pub commit_limit: usize,
}

impl AppState {
    /// Canned data for every external call.
    pub fn local_testing(commit_limit: usize) -> Self {
        AppState {
            repos: Arc::new(CannedRepoSource),
            llm: Arc::new(CannedTextGenerator),
            jobs: Arc::new(CannedJobIndex),
            commit_limit,
        }
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let credentials = match &config.mode {
            BackendMode::LocalTesting => {
                info!("Local testing enabled: serving canned data for all external calls");
                return Ok(Self::local_testing(config.commit_limit));
            }
            BackendMode::Live(credentials) => credentials,
        };

        let repos = GithubClient::new(
            &config.github.api_url,
            config.github.token.clone(),
            config.http_timeout,
        )
        .context("building GitHub client")?;
        info!(
            "GitHub client initialized ({}, token: {})",
            config.github.api_url,
            if config.github.token.is_some() { "yes" } else { "no" }
        );

        let llm = GeminiClient::new(
            credentials.google_api_key.clone(),
            GEMINI_API_URL,
            config.http_timeout,
        )
        .context("building Gemini client")?;
        info!("LLM client initialized (model: {})", crate::llm_client::MODEL);

        let pinecone = PineconeClient::new(
            &credentials.pinecone_api_key,
            PINECONE_CONTROL_URL,
            config.http_timeout,
        )
        .context("building Pinecone client")?;
        let index = pinecone
            .resolve_index(
                &config.pinecone.index_name,
                config.pinecone.index_host.as_deref(),
            )
            .await
            .context("resolving Pinecone index host")?;
        info!(
            "Pinecone index '{}' initialized (embed model: {})",
            config.pinecone.index_name, config.pinecone.embed_model
        );

        Ok(AppState {
            repos: Arc::new(repos),
            llm: Arc::new(llm),
            jobs: Arc::new(PineconeJobIndex::new(
                pinecone,
                index,
                config.pinecone.embed_model.clone(),
            )),
            commit_limit: config.commit_limit,
        })
    }
}
