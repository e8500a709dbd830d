//! Session persistence
//!
//! Each conversation is one pretty-printed JSON file at
//! `{data_dir}/sessions/{id}.json`. The id doubles as the creation timestamp
//! (`YYYYMMDDThhmmss`). A missing directory on read means zero records; a
//! file that fails to parse is skipped, never fatal.

use crate::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::ID_FORMAT;

/// Who authored a message. Doubles as the gateway's wire vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One turn in a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// One conversation: metadata plus the append-only chat log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Local>,
    pub chat: Vec<Message>,
}

impl Session {
    /// Create a fresh session with a time-based id and empty chat.
    ///
    /// Two sessions created within the same second share an id; that
    /// collision window is a known limitation of the file format.
    pub fn new() -> Self {
        let now = Local::now();
        Self {
            id: now.format(ID_FORMAT).to_string(),
            created_at: now,
            chat: Vec::new(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Manages per-session JSON files under `{data_dir}/sessions/`.
pub struct SessionStore {
    sessions_dir: PathBuf,
}

impl SessionStore {
    /// Create a store handle. The directory itself is created lazily on
    /// first write.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            sessions_dir: data_dir.join("sessions"),
        }
    }

    /// Write the session as pretty JSON, creating the directory if needed.
    pub async fn save(&self, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.sessions_dir).await?;

        let path = self.session_path(&session.id);
        let content = serde_json::to_string_pretty(session)?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        debug!("Saved session {}", session.id);
        Ok(())
    }

    /// Load all persisted sessions, newest first. A missing directory is
    /// zero records, not an error.
    pub async fn load_all(&self) -> Result<Vec<Session>> {
        let mut entries = match fs::read_dir(&self.sessions_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut sessions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable session file {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_str::<Session>(&content) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    warn!("Skipping malformed session file {}: {}", path.display(), e);
                }
            }
        }

        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    /// Remove a session's persisted record. Irreversible.
    pub async fn delete(&self, id: &str) -> Result<()> {
        fs::remove_file(self.session_path(id)).await?;
        debug!("Deleted session {}", id);
        Ok(())
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.sessions_dir.join(format!("{}.json", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_id_shape() {
        let session = Session::new();
        assert_eq!(session.id.len(), 15);
        assert_eq!(&session.id[8..9], "T");
        assert!(session.chat.is_empty());
        assert_eq!(session.id, session.created_at.format(ID_FORMAT).to_string());
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(Role::System.as_str(), "system");
    }

    #[test]
    fn test_role_serde_lowercase() {
        let msg = Message::assistant("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
