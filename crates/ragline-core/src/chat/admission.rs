//! Prompt admission control
//!
//! The assembled prompt is rendered to a canonical text form and measured
//! with the model's own tokenizer before the completion call is made.

use crate::error::{RaglineError, Result};
use crate::llm::{ChatMessage, Tokenizer};
use serde::Serialize;
use std::sync::Arc;

/// Measured size of an admitted prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdmissionReport {
    pub chars: usize,
    pub tokens: usize,
    pub budget: usize,
}

/// Canonical text form of a message sequence: `role: content` blocks
pub fn render_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Rejects prompts over the input token budget
pub struct AdmissionControl {
    tokenizer: Arc<dyn Tokenizer>,
    max_input_tokens: usize,
}

impl AdmissionControl {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, max_input_tokens: usize) -> Self {
        Self {
            tokenizer,
            max_input_tokens,
        }
    }

    /// Measure `messages`; a prompt at exactly the budget is admitted
    pub async fn check(&self, messages: &[ChatMessage]) -> Result<AdmissionReport> {
        let transcript = render_transcript(messages);
        let chars = transcript.chars().count();
        let tokens = self.tokenizer.count_tokens(&transcript).await?;

        if tokens > self.max_input_tokens {
            tracing::warn!(
                "Rejecting prompt: {} tokens ({} chars) over budget of {}",
                tokens,
                chars,
                self.max_input_tokens
            );
            return Err(RaglineError::OversizePrompt {
                tokens,
                budget: self.max_input_tokens,
                chars,
            });
        }

        tracing::debug!("Prompt admitted: {} tokens, {} chars", tokens, chars);
        Ok(AdmissionReport {
            chars,
            tokens,
            budget: self.max_input_tokens,
        })
    }
}
