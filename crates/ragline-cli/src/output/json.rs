//! JSON output formatter

use ragline_core::{CollectionInfo, IngestStats, QueryContext};
use serde::Serialize;
use serde_json::json;

pub fn to_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

pub fn format_collections(collections: &[CollectionInfo]) -> String {
    to_pretty(collections)
}

pub fn format_ingest_stats(collection: &str, stats: &IngestStats) -> String {
    to_pretty(&json!({
        "collection": collection,
        "documents": stats.documents,
        "chunks": stats.chunks,
        "inserted": stats.inserted,
        "skipped_sources": stats.skipped_sources,
    }))
}

pub fn format_answer(ctx: &QueryContext, show_prompt: bool) -> String {
    let mut value = json!({
        "query": ctx.query,
        "upgraded_query": ctx.upgraded_query,
        "collection": ctx.collection,
        "grounded": ctx.grounded,
        "answer": ctx.answer,
    });

    if show_prompt {
        value["top_chunks"] = json!(ctx.top_chunks);
        value["reranked_chunks"] = json!(ctx.reranked_chunks);
        value["prompt_chunks"] = json!(ctx.prompt_chunks);
        value["final_prompt"] = json!(ctx.final_prompt);
        value["admission"] = json!(ctx.admission);
    }
    to_pretty(&value)
}
