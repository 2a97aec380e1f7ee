//! repo2resume API: turns a GitHub repository into a STAR resume section,
//! writes cover letters, and searches a small job corpus held in Pinecone.

pub mod config;
pub mod errors;
pub mod generation;
pub mod ingest;
pub mod llm_client;
pub mod logging;
pub mod repo_data;
pub mod routes;
pub mod search;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
