//! Follow-up query rewriting
//!
//! Turns "what about its license?" into a self-contained search query using
//! prior turns. The rewrite keys retrieval and reranking only; the prompt
//! always carries the question as the user asked it.

use super::{ChatMessage, LLMClient};
use crate::error::Result;
use std::sync::Arc;

/// Upper bound on a rewritten query, in characters
pub const REWRITE_MAX_CHARS: usize = 1000;

const REWRITE_INSTRUCTION: &str = "You rewrite follow-up questions into standalone search queries. \
Using only the conversation so far as context, rephrase and augment the latest question so it can \
be understood without the conversation: resolve pronouns and fill in omitted subjects. \
Never answer the question. Output only the rewritten question.";

/// Rewrites follow-up questions using an LLM
pub struct QueryRewriter {
    client: Arc<dyn LLMClient>,
}

impl QueryRewriter {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    /// Rewrite `query` in the light of `history`.
    ///
    /// The first message of a session, or one without history, is returned
    /// unchanged and no model call is made.
    pub async fn rewrite(
        &self,
        query: &str,
        message_index: usize,
        history: &[ChatMessage],
    ) -> Result<String> {
        if message_index == 0 || history.is_empty() {
            return Ok(query.to_string());
        }

        let messages = vec![
            ChatMessage::system(REWRITE_INSTRUCTION),
            ChatMessage::user(build_rewrite_prompt(query, history)),
        ];
        let response = self.client.chat_completion(messages).await?;

        Ok(clean_rewrite(&response, query))
    }
}

fn build_rewrite_prompt(query: &str, history: &[ChatMessage]) -> String {
    let conversation = history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Conversation:\n{}\n\nLatest question: {}\n\nStandalone question:",
        conversation, query
    )
}

fn clean_rewrite(response: &str, original: &str) -> String {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        tracing::debug!("Empty rewrite, keeping original query");
        return original.to_string();
    }
    trimmed.chars().take(REWRITE_MAX_CHARS).collect()
}
