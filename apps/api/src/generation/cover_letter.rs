//! Cover letter generation. The model's text is returned as-is after
//! trimming; only emptiness is checked.

use serde::Deserialize;
use tracing::info;

use crate::generation::prompts::COVER_LETTER_PROMPT_TEMPLATE;
use crate::generation::{fill_template, GenerationError};
use crate::llm_client::prompts::{PLAIN_TEXT_INSTRUCTION, RESUME_WRITER_SYSTEM};
use crate::llm_client::{CompletionRequest, PromptKind, TextGenerator};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRequest {
    pub full_name: String,
    pub job_title: String,
    pub company_name: String,
    pub job_description: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl CoverLetterRequest {
    fn validate(&self) -> Result<(), GenerationError> {
        let required = [
            ("fullName", &self.full_name),
            ("jobTitle", &self.job_title),
            ("companyName", &self.company_name),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(GenerationError::InvalidInput(format!(
                "{field} cannot be empty"
            ))),
            None => Ok(()),
        }
    }
}

pub async fn generate_cover_letter(
    llm: &dyn TextGenerator,
    request: &CoverLetterRequest,
) -> Result<String, GenerationError> {
    request.validate()?;

    let prompt = build_cover_letter_prompt(request);
    let text = llm
        .complete(CompletionRequest {
            kind: PromptKind::CoverLetter,
            system: RESUME_WRITER_SYSTEM,
            prompt: &prompt,
        })
        .await?;

    let letter = text.trim();
    if letter.is_empty() {
        return Err(GenerationError::EmptyOutput);
    }

    info!(
        "Generated cover letter for {} ({} chars)",
        request.full_name,
        letter.len()
    );
    Ok(letter.to_string())
}

pub fn build_cover_letter_prompt(request: &CoverLetterRequest) -> String {
    let skills = request
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("full_name", request.full_name.trim()),
            ("job_title", request.job_title.trim()),
            ("company_name", request.company_name.trim()),
            ("job_description", request.job_description.trim()),
            ("skills", skills.as_str()),
            ("plain_text_instruction", PLAIN_TEXT_INSTRUCTION),
        ],
    )
}
