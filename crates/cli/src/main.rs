//! localclaw CLI — the main entry point.
//!
//! Commands:
//! - `chat`   — Interactive chat or single-message mode
//! - `memory` — Inspect, query, or delete long-term memories
//! - `todo`   — Show to-do lists
//! - `doctor` — Diagnose backend health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "localclaw",
    about = "localclaw — a local-first personal AI agent on Ollama",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Inspect long-term memory
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Show to-do lists
    Todo,

    /// Diagnose backend health
    Doctor,
}

#[derive(Subcommand)]
enum MemoryAction {
    /// List every stored record
    List,

    /// Search memory by similarity
    Query {
        /// The search text
        query: String,

        /// Maximum results
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },

    /// Delete a record by id
    Delete {
        /// The record id (from `memory list`)
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Memory { action } => match action {
            MemoryAction::List => commands::memory::list().await?,
            MemoryAction::Query { query, limit } => commands::memory::query(&query, limit).await?,
            MemoryAction::Delete { id } => commands::memory::delete(&id).await?,
        },
        Commands::Todo => commands::todo::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
