//! AI Notes
//!
//! A terminal client for conversational sessions with a chat-completion
//! service:
//! - Resume or start a conversation and exchange messages
//! - Distill the conversation into a persisted summary note on demand
//! - Browse saved notes and inject them back into the active chat

pub mod gateway;
pub mod store;
pub mod tui;

pub use gateway::CompletionGateway;
pub use store::{Message, Note, NoteStore, Role, Session, SessionStore};

use serde::Deserialize;
use std::path::PathBuf;

/// Default model when neither the CLI nor config.toml names one.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default completion API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for AI Notes
#[derive(Debug, Clone)]
pub struct AiNotesConfig {
    /// Root data directory (sessions/ and notes/ live under it)
    pub data_dir: PathBuf,

    /// Model identifier sent with every completion request
    pub model: String,

    /// Base URL of the completion API
    pub base_url: String,

    /// Bearer credential for the completion API
    pub api_key: String,
}

/// Optional settings read from `{data_dir}/config.toml`.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    model: Option<String>,
    base_url: Option<String>,
}

impl AiNotesConfig {
    pub fn new(data_dir: PathBuf, api_key: String) -> Self {
        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            data_dir,
            model: DEFAULT_MODEL.to_string(),
            base_url,
            api_key,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overlay `{data_dir}/config.toml` onto the defaults. A missing file is
    /// fine; a malformed one is a configuration error.
    pub fn apply_config_file(&mut self) -> Result<()> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(());
        }
        let content = std::fs::read_to_string(&path)?;
        let parsed: ConfigFile = toml::from_str(&content)
            .map_err(|e| AiNotesError::Config(format!("{}: {e}", path.display())))?;
        if let Some(model) = parsed.model {
            self.model = model;
        }
        if let Some(base_url) = parsed.base_url {
            self.base_url = base_url;
        }
        Ok(())
    }

    /// Resolve the data directory: explicit flag, then `AI_NOTES_HOME`,
    /// then `~/.ai-notes`.
    pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = flag {
            return Ok(dir);
        }
        if let Ok(home) = std::env::var("AI_NOTES_HOME") {
            if !home.trim().is_empty() {
                return Ok(PathBuf::from(home));
            }
        }
        let home = dirs::home_dir()
            .ok_or_else(|| AiNotesError::Config("could not determine home directory".into()))?;
        Ok(home.join(".ai-notes"))
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("ai-notes.log")
    }
}

/// Result type for AI Notes operations
pub type Result<T> = std::result::Result<T, AiNotesError>;

/// Errors that can occur in AI Notes
#[derive(Debug, thiserror::Error)]
pub enum AiNotesError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("completion API error: {0}")]
    Api(String),

    #[error("completion returned no choices")]
    EmptyResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AiNotesError {
    /// Whether a fresh attempt against the gateway could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AiNotesError::Network(_) => true,
            AiNotesError::Api(msg) => msg.starts_with("retryable"),
            _ => false,
        }
    }
}
