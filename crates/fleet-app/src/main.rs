//! # Fleet Issues - Issue intake backed by a relationship index
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  main.rs (this file) - Config, logging, command dispatch        │
//! │    │                                                            │
//! │    ├── wiring.rs: RelationshipIndex + InMemoryRelationshipStore │
//! │    │              EventConsumer task fed through an mpsc channel│
//! │    │              Gateway (token verifier + route guard)        │
//! │    └── commands/: replay, create-issue                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage:
//!   fleet-issues replay --events events.jsonl [--carrier 100]
//!   fleet-issues create-issue --events events.jsonl --user-id 100 \
//!       --title "Brakes" --content "Squealing" --type VEHICLE

mod commands;
mod wiring;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::{CreateIssueCommand, ReplayCommand};
use shared::ServiceConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fleet-issues")]
#[command(about = "Fleet Issues - carrier issue intake with vehicle/manager resolution")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (.json, .yaml or .yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an event log and report what the index resolves
    Replay(ReplayCommand),
    /// Replay an event log, then file an issue as a gateway-admitted caller
    CreateIssue(CreateIssueCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ServiceConfig::load(cli.config.as_deref())?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Replay(cmd) => cmd.run(&config).await,
        Commands::CreateIssue(cmd) => cmd.run(&config).await,
    }
}
