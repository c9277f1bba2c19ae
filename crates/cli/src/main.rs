//! Palaver CLI — the main entry point.
//!
//! Commands:
//! - `init` — write a starter agent config and tool descriptors
//! - `chat` — interactive chat or single-message mode

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "palaver",
    about = "Palaver — a minimal tool-negotiating conversational agent",
    version
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
    /// Write a starter agent configuration and tool descriptors
    Init {
        /// Directory to scaffold into
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Chat with the agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Path to the agent configuration file
        #[arg(short, long, default_value = "agent.json")]
        config: PathBuf,

        /// Directory holding per-tool descriptor files
        #[arg(long, default_value = "tools")]
        tools_dir: PathBuf,

        /// Backend to talk to: openai or anthropic
        #[arg(short, long, env = "PALAVER_BACKEND", default_value = "openai")]
        backend: String,

        /// Override the model identifier
        #[arg(long, env = "PALAVER_MODEL")]
        model: Option<String>,
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
        Commands::Init { dir } => commands::init::run(&dir)?,
        Commands::Chat {
            message,
            config,
            tools_dir,
            backend,
            model,
        } => commands::chat::run(message, &config, &tools_dir, &backend, model).await?,
    }

    Ok(())
}
