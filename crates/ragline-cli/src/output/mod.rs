//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use ragline_core::{CollectionInfo, IngestStats, QueryContext};

pub fn format_collections(collections: &[CollectionInfo], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_collections(collections),
        OutputFormat::Cli => terminal::format_collections(collections),
    }
}

pub fn format_collection_info(info: &CollectionInfo, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(info),
        OutputFormat::Cli => terminal::format_collection_info(info),
    }
}

pub fn format_ingest_stats(collection: &str, stats: &IngestStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_ingest_stats(collection, stats),
        OutputFormat::Cli => terminal::format_ingest_stats(collection, stats),
    }
}

/// Format an answered query; `show_prompt` adds retrieval details
pub fn format_answer(ctx: &QueryContext, format: OutputFormat, show_prompt: bool) -> String {
    match format {
        OutputFormat::Json => json::format_answer(ctx, show_prompt),
        OutputFormat::Cli => terminal::format_answer(ctx, show_prompt),
    }
}
