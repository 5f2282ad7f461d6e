//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ragline")]
#[command(
    author,
    version,
    about = "Retrieval-augmented question answering over your own documents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "RAGLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build (or rebuild) a collection from URLs, files or directories
    Ingest(IngestArgs),

    /// Ask a single question
    Ask(AskArgs),

    /// Interactive chat session
    Chat(ChatArgs),

    /// Manage collections
    Collection(CollectionArgs),
}

#[derive(Args)]
pub struct IngestArgs {
    /// URLs, files or directories to ingest
    #[arg(required = true)]
    pub sources: Vec<String>,

    /// Target collection; an existing one is replaced
    #[arg(short, long)]
    pub collection: String,
}

#[derive(Args)]
pub struct AskArgs {
    /// Question
    pub query: Vec<String>,

    /// Ground the answer in this collection
    #[arg(short, long)]
    pub collection: Option<String>,

    /// JSON file holding the conversation; read before and written after the question
    #[arg(long)]
    pub session: Option<PathBuf>,

    /// Print retrieval results and the final prompt
    #[arg(long)]
    pub show_prompt: bool,
}

#[derive(Args)]
pub struct ChatArgs {
    /// Ground answers in this collection
    #[arg(short, long)]
    pub collection: Option<String>,

    /// Print retrieval results and the final prompt for every question
    #[arg(long)]
    pub show_prompt: bool,
}

#[derive(Args)]
pub struct CollectionArgs {
    #[command(subcommand)]
    pub action: CollectionAction,
}

#[derive(Subcommand)]
pub enum CollectionAction {
    /// List all collections
    List,
    /// Show collection details
    Info { name: String },
    /// Remove a collection
    #[command(alias = "rm")]
    Remove { name: String },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
