//! End-to-end tests for the query pipeline
//!
//! Covers:
//! 1. Ungrounded answers (no collection, missing collection, nothing relevant)
//! 2. Grounded answers with strict relevance filtering
//! 3. Follow-up rewriting keyed retrieval
//! 4. History bounds across exchanges
//! 5. Admission control and upstream failures

mod common;

use common::*;
use ragline_core::chat::NO_CONTEXT_DISCLAIMER;
use ragline_core::{ConversationHistory, RaglineError, Role};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_no_collection_answers_ungrounded() {
    let h = Harness::new(KeywordReranker::new("anything", 0.9, 0.0));
    let pipeline = h.query_pipeline();

    let ctx = pipeline
        .process("What is 2+2?", 0, None, ConversationHistory::new())
        .await
        .unwrap();

    assert!(!ctx.grounded);
    assert!(ctx.prompt_chunks.is_empty());
    assert!(ctx.rendered_prompt().contains(NO_CONTEXT_DISCLAIMER));
    assert_eq!(ctx.answer.as_deref(), Some("answer 1"));
    assert_eq!(ctx.new_history.as_ref().map(|h| h.len()), Some(2));
    assert_eq!(ctx.upgraded_query, "What is 2+2?");
    assert_eq!(h.llm.rewrite_calls(), 0);
    assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_configured_system_instruction_leads_prompt() {
    let mut h = Harness::new(KeywordReranker::new("anything", 0.9, 0.0));
    h.config.chat.system_instruction = Some("Answer like a ship's log.".to_string());

    let ctx = h
        .query_pipeline()
        .process("Where are we?", 0, None, ConversationHistory::new())
        .await
        .unwrap();

    assert_eq!(ctx.final_prompt[0].role, Role::System);
    assert_eq!(ctx.final_prompt[0].content, "Answer like a ship's log.");
    assert!(ctx.final_prompt.last().unwrap().content.contains("Where are we?"));
}

#[tokio::test]
async fn test_missing_collection_answers_ungrounded() {
    let h = Harness::new(KeywordReranker::new("anything", 0.9, 0.0));
    let ctx = h
        .query_pipeline()
        .process("What is 2+2?", 0, Some("nope"), ConversationHistory::new())
        .await
        .unwrap();

    assert!(!ctx.grounded);
    assert!(ctx.rendered_prompt().contains(NO_CONTEXT_DISCLAIMER));
    assert!(ctx.answer.is_some());
    assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_single_relevant_chunk_grounds_answer() {
    let h = Harness::new(KeywordReranker::new("SQLite", 0.9, 0.05));
    h.seed_collection(
        "docs",
        &[
            "[Source: Databases]\nSQLite is an embedded SQL database engine.",
            "[Source: Fruit]\nApples grow on trees.",
            "[Source: Weather]\nIt rains a lot in autumn.",
        ],
    );

    let ctx = h
        .query_pipeline()
        .process("What is SQLite?", 0, Some("docs"), ConversationHistory::new())
        .await
        .unwrap();

    assert!(ctx.grounded);
    assert_eq!(ctx.top_chunks.len(), 3);
    assert_eq!(ctx.reranked_chunks.len(), 3);
    assert_eq!(ctx.prompt_chunks.len(), 1);
    assert!(ctx.prompt_chunks[0].text.contains("embedded SQL database"));
    assert!(ctx.query_embedding.is_some());

    let prompt = ctx.rendered_prompt();
    assert!(prompt.contains("SQLite is an embedded SQL database engine."));
    assert!(!prompt.contains("Apples grow on trees."));
    assert!(!prompt.contains(NO_CONTEXT_DISCLAIMER));
}

#[tokio::test]
async fn test_nothing_above_threshold_is_ungrounded() {
    // Exactly at the threshold is not enough
    let h = Harness::new(KeywordReranker::new("SQLite", 0.2, 0.2));
    h.seed_collection("docs", &["SQLite notes", "more SQLite notes"]);

    let ctx = h
        .query_pipeline()
        .process("What is SQLite?", 0, Some("docs"), ConversationHistory::new())
        .await
        .unwrap();

    assert_eq!(ctx.top_chunks.len(), 2);
    assert!(ctx.prompt_chunks.is_empty());
    assert!(!ctx.grounded);
    assert!(ctx.rendered_prompt().contains(NO_CONTEXT_DISCLAIMER));
    assert!(ctx.answer.is_some());
}

#[tokio::test]
async fn test_prompt_chunks_capped_at_top_k() {
    let mut h = Harness::new(KeywordReranker::new("fact", 0.9, 0.0));
    h.config.retrieval.prompt_top_k = 2;
    h.seed_collection("docs", &["fact one", "fact two", "fact three", "fact four"]);

    let ctx = h
        .query_pipeline()
        .process("facts?", 0, Some("docs"), ConversationHistory::new())
        .await
        .unwrap();

    assert_eq!(ctx.reranked_chunks.len(), 4);
    assert_eq!(ctx.prompt_chunks.len(), 2);
}

#[tokio::test]
async fn test_follow_up_retrieval_uses_rewritten_query() {
    let h = Harness::new(KeywordReranker::new("SQLite", 0.9, 0.0));
    h.seed_collection("docs", &["SQLite is public domain."]);
    let pipeline = h.query_pipeline();

    let first = pipeline
        .process("Tell me about SQLite", 0, Some("docs"), ConversationHistory::new())
        .await
        .unwrap();
    let history = first.new_history.unwrap();

    let second = pipeline
        .process("What is its license?", history.turns(), Some("docs"), history)
        .await
        .unwrap();

    assert_eq!(second.message_index, 1);
    assert_eq!(second.upgraded_query, "rewritten standalone query");
    assert_eq!(h.llm.rewrite_calls(), 1);

    let queries = h.reranker.queries.lock().unwrap().clone();
    assert_eq!(queries, vec!["Tell me about SQLite", "rewritten standalone query"]);

    // The prompt still carries the question as asked
    let last_user = second.final_prompt.last().unwrap();
    assert!(last_user.content.ends_with("Question: What is its license?"));
    // Prior turns are included after the first message
    assert_eq!(second.final_prompt.len(), 4);
}

#[tokio::test]
async fn test_history_stays_bounded_and_recent() {
    let h = Harness::new(KeywordReranker::new("x", 0.9, 0.0));
    let pipeline = h.query_pipeline();
    let max_turns = h.config.chat.max_turns;

    let mut history = ConversationHistory::new();
    for i in 0..7 {
        let ctx = pipeline
            .process(&format!("question {}", i), history.turns(), None, history.clone())
            .await
            .unwrap();
        history = ctx.new_history.unwrap();
        assert!(history.len() <= 2 * max_turns);
    }

    let contents: Vec<_> = history.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        vec!["question 4", "answer 5", "question 5", "answer 6", "question 6", "answer 7"]
    );
}

#[tokio::test]
async fn test_oversize_prompt_rejected_without_answer() {
    let mut h = Harness::new(KeywordReranker::new("x", 0.9, 0.0));
    h.config.chat.max_input_tokens = 200;
    let pipeline = h.query_pipeline();

    let long = "word ".repeat(100);
    let mut history = ConversationHistory::new();
    for _ in 0..h.config.chat.max_turns {
        history = history.with_turn(long.as_str(), long.as_str(), h.config.chat.max_turns);
    }

    let err = pipeline
        .process("and then?", history.turns(), None, history)
        .await
        .unwrap_err();

    match err {
        RaglineError::OversizePrompt { tokens, budget, .. } => {
            assert!(tokens > budget);
            assert_eq!(budget, 200);
        }
        other => panic!("expected oversize prompt, got {:?}", other),
    }
    assert_eq!(h.llm.answer_calls(), 0);
}

#[tokio::test]
async fn test_reranker_failure_fails_request() {
    let h = Harness::new(KeywordReranker::failing());
    h.seed_collection("docs", &["some text"]);

    let err = h
        .query_pipeline()
        .process("q", 0, Some("docs"), ConversationHistory::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RaglineError::UpstreamService { service: "reranker", .. }));
    assert_eq!(h.llm.answer_calls(), 0);
}

#[tokio::test]
async fn test_embedding_failure_fails_grounded_request() {
    let h = Harness::new(KeywordReranker::new("x", 0.9, 0.0));
    h.seed_collection("docs", &["some text"]);
    h.embedder.fail.store(true, Ordering::SeqCst);

    let err = h
        .query_pipeline()
        .process("q", 0, Some("docs"), ConversationHistory::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RaglineError::UpstreamService { status: 503, .. }));
    assert_eq!(h.llm.answer_calls(), 0);
}

#[tokio::test]
async fn test_caller_history_not_mutated() {
    let h = Harness::new(KeywordReranker::new("x", 0.9, 0.0));
    let history = ConversationHistory::new().with_turn("q0", "a0", 3);

    let ctx = h
        .query_pipeline()
        .process("q1", 1, None, history.clone())
        .await
        .unwrap();

    assert_eq!(ctx.history, history);
    assert_eq!(history.len(), 2);
    assert_eq!(ctx.new_history.unwrap().len(), 4);
}
