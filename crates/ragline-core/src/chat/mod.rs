//! Question answering
//!
//! Conversation history, prompt assembly, admission control and the query
//! orchestrator that ties retrieval to generation.

pub mod admission;
mod history;
pub mod pipeline;
pub mod prompt;

pub use admission::{render_transcript, AdmissionControl, AdmissionReport};
pub use history::ConversationHistory;
pub use pipeline::{QueryContext, QueryPipeline};
pub use prompt::{PromptAssembler, NO_CONTEXT_DISCLAIMER};
