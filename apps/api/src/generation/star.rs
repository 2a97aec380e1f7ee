//! STAR project section: turns an aggregated repository into four resume
//! sentences (Situation, Task, Action, Result).
//!
//! The model's output is accepted only if it yields exactly four
//! `- Label: sentence` lines. Anything else is rejected, never padded or truncated.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::generation::prompts::STAR_PROMPT_TEMPLATE;
use crate::generation::{fill_template, GenerationError};
use crate::llm_client::prompts::{PLAIN_TEXT_INSTRUCTION, RESUME_WRITER_SYSTEM};
use crate::llm_client::{CompletionRequest, PromptKind, TextGenerator};
use crate::repo_data::AggregateRepoRecord;

/// Situation, Task, Action, Result.
pub const STAR_COMPONENTS: usize = 4;
/// Commit messages included in the prompt.
const PROMPT_COMMIT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarSection {
    pub name: String,
    pub date: String,
    /// Ordered by descending share of the codebase.
    pub languages: Vec<String>,
    /// In Situation, Task, Action, Result order.
    pub descriptions: [String; STAR_COMPONENTS],
}

/// Generates the STAR section for an aggregated repository.
pub async fn generate_star_section(
    llm: &dyn TextGenerator,
    record: &AggregateRepoRecord,
) -> Result<StarSection, GenerationError> {
    if record.name.trim().is_empty() {
        return Err(GenerationError::InvalidInput(
            "repository record has no name".to_string(),
        ));
    }

    let prompt = build_star_prompt(record);
    let text = llm
        .complete(CompletionRequest {
            kind: PromptKind::StarSection,
            system: RESUME_WRITER_SYSTEM,
            prompt: &prompt,
        })
        .await?;

    let descriptions = parse_star_response(&text).map_err(|e| {
        warn!(
            "Rejected STAR response for {}: {e}; raw={:?}",
            record.name,
            text.chars().take(200).collect::<String>()
        );
        e
    })?;

    info!("Generated STAR section for {}", record.name);

    Ok(StarSection {
        name: record.name.clone(),
        date: record.date_range(),
        languages: record.language_names(),
        descriptions,
    })
}

/// Builds the prompt from the repository record. Deterministic for a given record.
pub fn build_star_prompt(record: &AggregateRepoRecord) -> String {
    let languages: BTreeMap<&str, f64> = record
        .languages
        .iter()
        .map(|l| (l.language.as_str(), l.percent))
        .collect();
    // A map of strings to floats always serializes.
    let languages_json = serde_json::to_string_pretty(&languages).unwrap_or_default();

    let commit_messages = record
        .recent_commit_messages
        .iter()
        .take(PROMPT_COMMIT_LIMIT)
        .map(|m| m.lines().next().unwrap_or_default().trim())
        .collect::<Vec<_>>()
        .join(", ");

    let topics = record.topics.join(", ");
    fill_template(
        STAR_PROMPT_TEMPLATE,
        &[
            ("name", record.name.as_str()),
            ("description", record.description.as_str()),
            ("topics", topics.as_str()),
            ("languages_json", languages_json.as_str()),
            ("commit_messages", commit_messages.as_str()),
            ("plain_text_instruction", PLAIN_TEXT_INSTRUCTION),
        ],
    )
}

/// Extracts the four STAR sentences from the model's response.
///
/// Every line containing `": "` counts; its text after the first `": "` is the
/// sentence. Markdown emphasis markers are ignored.
pub fn parse_star_response(text: &str) -> Result<[String; STAR_COMPONENTS], GenerationError> {
    let sentences: Vec<String> = text
        .lines()
        .map(|line| line.replace('*', ""))
        .filter_map(|line| {
            line.split_once(": ")
                .map(|(_, sentence)| sentence.trim().to_string())
        })
        .collect();

    let found = sentences.len();
    sentences
        .try_into()
        .map_err(|_| GenerationError::Malformed {
            expected: STAR_COMPONENTS,
            found,
        })
}
