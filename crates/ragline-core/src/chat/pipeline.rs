//! Query orchestrator
//!
//! rewrite → embed → search → rerank/filter → assemble → admit → answer → history.
//! A query runs ungrounded when no collection is given, the collection does
//! not exist, or no candidate survives relevance filtering.

use super::{AdmissionControl, AdmissionReport, ConversationHistory, PromptAssembler};
use crate::config::{Config, RetrievalConfig};
use crate::db::{SearchHit, VectorStore};
use crate::error::Result;
use crate::index::EmbeddingClient;
use crate::llm::{ChatMessage, LLMClient, QueryRewriter, Reranker, Tokenizer};
use crate::locks::CollectionLocks;
use crate::search::{self, ScoredChunk};
use std::sync::Arc;
use std::time::Instant;

/// Per-request state, owned by a single `process` call
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub query: String,
    /// Completed turns before this question (0 = first message)
    pub message_index: usize,
    pub collection: Option<String>,
    pub history: ConversationHistory,
    /// Self-contained query used for retrieval and reranking
    pub upgraded_query: String,
    pub query_embedding: Option<Vec<f32>>,
    pub top_chunks: Vec<SearchHit>,
    pub reranked_chunks: Vec<ScoredChunk>,
    /// Chunks that passed the relevance filter and went into the prompt
    pub prompt_chunks: Vec<ScoredChunk>,
    pub final_prompt: Vec<ChatMessage>,
    pub admission: Option<AdmissionReport>,
    pub answer: Option<String>,
    pub grounded: bool,
    /// History to pass to the next request
    pub new_history: Option<ConversationHistory>,
}

impl QueryContext {
    fn new(
        query: &str,
        message_index: usize,
        collection: Option<&str>,
        history: ConversationHistory,
    ) -> Self {
        Self {
            query: query.to_string(),
            message_index,
            collection: collection.map(str::to_string),
            history,
            upgraded_query: query.to_string(),
            query_embedding: None,
            top_chunks: Vec::new(),
            reranked_chunks: Vec::new(),
            prompt_chunks: Vec::new(),
            final_prompt: Vec::new(),
            admission: None,
            answer: None,
            grounded: false,
            new_history: None,
        }
    }

    /// Final prompt in its canonical text form
    pub fn rendered_prompt(&self) -> String {
        super::admission::render_transcript(&self.final_prompt)
    }
}

/// Answers questions, grounded in a collection when one is available
pub struct QueryPipeline {
    rewriter: QueryRewriter,
    embeddings: EmbeddingClient,
    store: Arc<dyn VectorStore>,
    reranker: Arc<dyn Reranker>,
    llm: Arc<dyn LLMClient>,
    assembler: PromptAssembler,
    admission: AdmissionControl,
    locks: CollectionLocks,
    retrieval: RetrievalConfig,
    max_turns: usize,
}

impl QueryPipeline {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        tokenizer: Arc<dyn Tokenizer>,
        embeddings: EmbeddingClient,
        reranker: Arc<dyn Reranker>,
        store: Arc<dyn VectorStore>,
        locks: CollectionLocks,
        config: &Config,
    ) -> Self {
        Self {
            rewriter: QueryRewriter::new(llm.clone()),
            embeddings,
            store,
            reranker,
            llm,
            assembler: config
                .chat
                .system_instruction
                .as_deref()
                .map(PromptAssembler::new)
                .unwrap_or_default(),
            admission: AdmissionControl::new(tokenizer, config.chat.max_input_tokens),
            locks,
            retrieval: config.retrieval.clone(),
            max_turns: config.chat.max_turns,
        }
    }

    /// Answer one question.
    ///
    /// Fails with `OversizePrompt` when the assembled prompt exceeds the
    /// token budget; the model is not called in that case. Upstream failures
    /// in embedding, reranking or generation also fail the request.
    pub async fn process(
        &self,
        query: &str,
        message_index: usize,
        collection: Option<&str>,
        history: ConversationHistory,
    ) -> Result<QueryContext> {
        let total = Instant::now();
        let mut ctx = QueryContext::new(query, message_index, collection, history);

        let start = Instant::now();
        ctx.upgraded_query = self
            .rewriter
            .rewrite(query, message_index, ctx.history.messages())
            .await?;
        tracing::debug!("Rewrote query in {} ms", start.elapsed().as_millis());

        if let Some(name) = collection {
            self.retrieve_context(&mut ctx, name).await?;
        }

        ctx.grounded = !ctx.prompt_chunks.is_empty();
        ctx.final_prompt = self.assembler.assemble(
            query,
            message_index,
            &ctx.history,
            &ctx.prompt_chunks,
        );
        tracing::info!(
            "Answering {} ({} context chunks)",
            if ctx.grounded { "grounded" } else { "ungrounded" },
            ctx.prompt_chunks.len()
        );

        ctx.admission = Some(self.admission.check(&ctx.final_prompt).await?);

        let start = Instant::now();
        let answer = self.llm.chat_completion(ctx.final_prompt.clone()).await?;
        tracing::debug!(
            "Generated answer with {} in {} ms",
            self.llm.model_name(),
            start.elapsed().as_millis()
        );

        ctx.new_history = Some(
            ctx.history
                .clone()
                .with_turn(query, answer.as_str(), self.max_turns),
        );
        ctx.answer = Some(answer);

        tracing::debug!("Processed query in {} ms", total.elapsed().as_millis());
        Ok(ctx)
    }

    /// Fill the retrieval fields of `ctx` from `collection`.
    ///
    /// A missing collection leaves them empty; embedding and reranking
    /// failures are errors.
    async fn retrieve_context(&self, ctx: &mut QueryContext, collection: &str) -> Result<()> {
        let _guard = self.locks.read(collection).await;

        let exists = self.store.has_collection(collection).unwrap_or_else(|e| {
            tracing::warn!("Could not check collection '{}': {}", collection, e);
            false
        });
        if !exists {
            tracing::warn!("Collection '{}' not found, answering without context", collection);
            return Ok(());
        }

        let start = Instant::now();
        let embedding = self.embeddings.embed_query(&ctx.upgraded_query).await?;
        tracing::debug!("Embedded query in {} ms", start.elapsed().as_millis());

        ctx.top_chunks = search::retrieve(
            self.store.as_ref(),
            collection,
            &embedding,
            self.retrieval.search_top_k,
        );
        ctx.query_embedding = Some(embedding);

        ctx.reranked_chunks =
            search::rerank(self.reranker.as_ref(), &ctx.upgraded_query, &ctx.top_chunks).await?;
        ctx.prompt_chunks = search::filter(
            &ctx.reranked_chunks,
            self.retrieval.rerank_min_score,
            self.retrieval.prompt_top_k,
        );
        Ok(())
    }
}
