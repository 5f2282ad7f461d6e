//! Ask command

use crate::app::{AskArgs, OutputFormat};
use crate::output;
use crate::services::Services;
use anyhow::{Context, Result};
use ragline_core::{ConversationHistory, RaglineError};
use std::path::Path;

pub async fn run(args: AskArgs, services: &Services, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    if query.trim().is_empty() {
        return Err(RaglineError::InvalidInput("Query must not be empty".to_string()).into());
    }

    let history = match &args.session {
        Some(path) => read_session(path)?,
        None => ConversationHistory::new(),
    };

    let pipeline = services.query_pipeline()?;
    let ctx = pipeline
        .process(&query, history.turns(), args.collection.as_deref(), history)
        .await?;

    if let (Some(path), Some(new_history)) = (&args.session, &ctx.new_history) {
        write_session(path, new_history)?;
    }

    println!("{}", output::format_answer(&ctx, format, args.show_prompt));
    Ok(())
}

/// A missing session file starts a new conversation
fn read_session(path: &Path) -> Result<ConversationHistory> {
    if !path.exists() {
        return Ok(ConversationHistory::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading session {}", path.display()))?;
    let history = serde_json::from_str(&content).map_err(|e| {
        RaglineError::InvalidInput(format!("Invalid session file {}: {}", path.display(), e))
    })?;
    Ok(history)
}

fn write_session(path: &Path, history: &ConversationHistory) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(history)?)
        .with_context(|| format!("writing session {}", path.display()))?;
    Ok(())
}
