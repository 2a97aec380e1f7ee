//! Fixed completions served in local-testing mode.

use async_trait::async_trait;
use tracing::info;

use crate::llm_client::{CompletionRequest, LlmError, PromptKind, TextGenerator};

pub const CANNED_STAR_RESPONSE: &str = "\
- Situation: Job seekers spent hours translating their GitHub projects into resume-ready descriptions.
- Task: Build a service that turns repository metadata into concise, STAR-formatted resume content.
- Action: Developed a FastAPI backend integrating the GitHub API and a generative language model to summarize repositories.
- Result: Reduced resume preparation time by automating project descriptions for hackathon participants.";

pub const CANNED_COVER_LETTER: &str = "\
Dear Hiring Manager,

I am excited to apply for this role and to bring my engineering experience to your team. I am applying for Software Engineer at TechCorp Inc.

In recent projects I built scalable web applications with Python and React.js, deployed services to Azure, and collaborated closely with cross-functional teams in an Agile environment.

These experiences have prepared me to deliver reliable software quickly, and I am confident my problem-solving skills would add immediate value to your organization.

I would welcome the opportunity to discuss how I can contribute to your team. Thank you for your time and consideration.

Sincerely,
John Doe";

/// Returns the same completion for every prompt of a given kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedTextGenerator;

#[async_trait]
impl TextGenerator for CannedTextGenerator {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        info!("Using sample {:?} completion (local testing)", request.kind);
        Ok(match request.kind {
            PromptKind::StarSection => CANNED_STAR_RESPONSE,
            PromptKind::CoverLetter => CANNED_COVER_LETTER,
        }
        .to_string())
    }
}
