//! Interactive chat command

use crate::app::{ChatArgs, OutputFormat};
use crate::output;
use crate::services::Services;
use anyhow::Result;
use ragline_core::{ConversationHistory, RaglineError};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(args: ChatArgs, services: &Services) -> Result<()> {
    let pipeline = services.query_pipeline()?;
    let collection = args.collection.as_deref();

    match collection {
        Some(name) => eprintln!("Chatting with collection '{}'. /clear resets, /exit quits.", name),
        None => eprintln!("Chatting without a collection. /clear resets, /exit quits."),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history = ConversationHistory::new();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        match query {
            "" => continue,
            "/exit" | "/quit" => break,
            "/clear" => {
                history = ConversationHistory::new();
                eprintln!("History cleared");
                continue;
            }
            _ => {}
        }

        match pipeline
            .process(query, history.turns(), collection, history.clone())
            .await
        {
            Ok(ctx) => {
                println!(
                    "{}\n",
                    output::format_answer(&ctx, OutputFormat::Cli, args.show_prompt)
                );
                if let Some(next) = ctx.new_history {
                    history = next;
                }
            }
            // An oversize prompt leaves the session usable
            Err(e @ RaglineError::OversizePrompt { .. }) => {
                eprintln!("{}. Try /clear or a shorter question.", e);
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }
    Ok(())
}
