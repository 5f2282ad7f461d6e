//! Prompt assembly
//!
//! System instruction, then prior turns, then either a grounded question
//! with enumerated context or an ungrounded question carrying an explicit
//! no-context disclaimer.

use super::ConversationHistory;
use crate::llm::ChatMessage;
use crate::search::ScoredChunk;

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that answers questions \
accurately and concisely. When context passages are provided, base your answer on them and say so \
when they do not contain the answer. Answer in the language of the question.";

/// Sentence every ungrounded prompt carries
pub const NO_CONTEXT_DISCLAIMER: &str = "No relevant context was found for this question.";

/// Builds the message sequence sent to the language model
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system_instruction: String,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_INSTRUCTION)
    }
}

impl PromptAssembler {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
        }
    }

    /// Assemble the prompt. An empty `chunks` slice selects the ungrounded form.
    pub fn assemble(
        &self,
        query: &str,
        message_index: usize,
        history: &ConversationHistory,
        chunks: &[ScoredChunk],
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.system_instruction.as_str()));

        if message_index > 0 {
            messages.extend(history.messages().iter().cloned());
        }

        let user = if chunks.is_empty() {
            ungrounded_message(query)
        } else {
            grounded_message(query, chunks)
        };
        messages.push(ChatMessage::user(user));
        messages
    }
}

fn grounded_message(query: &str, chunks: &[ScoredChunk]) -> String {
    let context = chunks
        .iter()
        .enumerate()
        .map(|(i, c)| format!("[{}] {}", i + 1, c.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Answer the question using the numbered context passages below. \
         Each passage starts with its source.\n\nContext:\n{}\n\nQuestion: {}",
        context, query
    )
}

fn ungrounded_message(query: &str) -> String {
    format!(
        "{} Answer from your general knowledge, and state at the start of your answer that \
         no relevant context was found.\n\nQuestion: {}",
        NO_CONTEXT_DISCLAIMER, query
    )
}
