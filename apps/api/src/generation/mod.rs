// Resume content generation: STAR project sections and cover letters.
// All model calls go through llm_client::TextGenerator; nothing here talks HTTP.

use thiserror::Error;

use crate::llm_client::LlmError;

pub mod cover_letter;
pub mod handlers;
pub mod prompts;
pub mod star;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed model response: expected {expected} STAR lines, found {found}")]
    Malformed { expected: usize, found: usize },

    #[error("Model returned an empty response")]
    EmptyOutput,

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Fills `{key}` placeholders in a single pass over `template`.
/// Inserted values are never rescanned, and unknown `{...}` text is kept as-is.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let filled = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, close))
        });
        match filled {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let filled = fill_template(
            "Hi {name}, re: {title}",
            &[("name", "{title}"), ("title", "Engineer")],
        );
        assert_eq!(filled, "Hi {title}, re: Engineer");
    }

    #[test]
    fn test_fill_template_keeps_unknown_and_unclosed_braces() {
        let filled = fill_template("{a} {b} {json", &[("a", "1")]);
        assert_eq!(filled, "1 {b} {json");
    }
}
