//! Terminal output formatter

use ragline_core::{CollectionInfo, IngestStats, QueryContext};
use std::fmt::Write;

const PREVIEW_CHARS: usize = 120;

pub fn format_collections(collections: &[CollectionInfo]) -> String {
    if collections.is_empty() {
        return "No collections".to_string();
    }
    collections
        .iter()
        .map(|c| format!("{}: {} records ({} dims)", c.name, c.record_count, c.dimensions))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_collection_info(info: &CollectionInfo) -> String {
    format!(
        "Collection: {}\nRecords:    {}\nDimensions: {}\nMetric:     {}\nCreated:    {}",
        info.name, info.record_count, info.dimensions, info.metric, info.created_at
    )
}

pub fn format_ingest_stats(collection: &str, stats: &IngestStats) -> String {
    let mut out = format!(
        "Ingested {} documents into '{}' ({} chunks, {} records)",
        stats.documents, collection, stats.chunks, stats.inserted
    );
    for source in &stats.skipped_sources {
        let _ = write!(out, "\nSkipped: {}", source);
    }
    out
}

pub fn format_answer(ctx: &QueryContext, show_prompt: bool) -> String {
    let mut out = String::new();

    if show_prompt {
        if ctx.upgraded_query != ctx.query {
            let _ = writeln!(out, "Rewritten query: {}\n", ctx.upgraded_query);
        }
        if !ctx.reranked_chunks.is_empty() {
            let _ = writeln!(out, "Reranked chunks:");
            for chunk in &ctx.reranked_chunks {
                let _ = writeln!(
                    out,
                    "  {:>7.3}  {}",
                    chunk.score,
                    preview(&chunk.text, PREVIEW_CHARS)
                );
            }
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "Prompt:\n{}", ctx.rendered_prompt());
        if let Some(report) = ctx.admission {
            let _ = writeln!(
                out,
                "({} chars, {} of {} tokens)",
                report.chars, report.tokens, report.budget
            );
        }
        let _ = writeln!(out);
    }

    if !ctx.grounded && ctx.collection.is_some() {
        let _ = writeln!(out, "(no relevant context found)");
    }
    out.push_str(ctx.answer.as_deref().unwrap_or_default());
    out
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
