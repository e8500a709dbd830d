//! AI Notes CLI
//!
//! Terminal chat client with per-session summary notes.

use ai_notes::tui::App;
use ai_notes::{AiNotesConfig, AiNotesError, CompletionGateway, NoteStore, SessionStore};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// AI Notes - chat with a model, distill conversations into notes
#[derive(Parser, Debug)]
#[command(name = "ai-notes")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model to use for completions (overrides config.toml)
    #[arg(long)]
    model: Option<String>,

    /// Data directory (default: $AI_NOTES_HOME or ~/.ai-notes)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = AiNotesConfig::resolve_data_dir(cli.data_dir)?;

    // Missing credential is fatal at startup, before any terminal takeover.
    let api_key = std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or(AiNotesError::MissingApiKey)?;

    let mut config = AiNotesConfig::new(data_dir, api_key);
    config.apply_config_file()?;
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }

    init_logging(&config, cli.verbose)?;
    info!("Starting AI Notes (model: {})", config.model);

    let gateway = CompletionGateway::new(&config);
    let session_store = SessionStore::new(&config.data_dir);
    let note_store = NoteStore::new(&config.data_dir);

    let sessions = session_store
        .load_all()
        .await
        .context("loading sessions")?;
    info!("Loaded {} session(s)", sessions.len());

    let mut app = App::new(gateway, session_store, note_store, config.model.clone(), sessions)?;
    app.run().await?;

    Ok(())
}

/// Log to a file in the data directory; the terminal belongs to the TUI.
fn init_logging(config: &AiNotesConfig, verbose: bool) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.data_dir)?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_file())?;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(())
}
