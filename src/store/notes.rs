//! Note persistence
//!
//! Each note is one markdown file at `{data_dir}/notes/{id}.md`:
//! a `# Notes-{session_id}-{id}` title line, a blank line, then the body.
//! The title and the loader are co-designed; a title that does not match the
//! three-part form falls back to the file stem as the note id.

use crate::Result;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::ID_FORMAT;

/// A persisted, immutable summary derived from a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub session_id: String,
    pub title: String,
    pub body: String,
    /// Unset when the id does not parse as a timestamp; such notes still
    /// load and sort last.
    pub created_at: Option<DateTime<Local>>,
}

impl Note {
    /// Create a note for a session with the given summary body.
    pub fn new(session_id: &str, body: impl Into<String>) -> Self {
        let now = Local::now();
        let id = now.format(ID_FORMAT).to_string();
        Self {
            title: format!("Notes-{}-{}", session_id, id),
            id,
            session_id: session_id.to_string(),
            body: body.into(),
            created_at: Some(now),
        }
    }
}

/// Manages per-note markdown files under `{data_dir}/notes/`.
pub struct NoteStore {
    notes_dir: PathBuf,
}

impl NoteStore {
    /// Create a store handle. The directory itself is created lazily on
    /// first write.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            notes_dir: data_dir.join("notes"),
        }
    }

    /// Write the note, creating the directory if needed. Returns the full
    /// path of the saved file.
    pub async fn save(&self, note: &Note) -> Result<PathBuf> {
        fs::create_dir_all(&self.notes_dir).await?;

        let path = self.notes_dir.join(format!("{}.md", note.id));
        let content = format!("# {}\n\n{}", note.title, note.body);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        debug!("Saved note {} for session {}", note.id, note.session_id);
        Ok(path)
    }

    /// Load all persisted notes, newest first (unparsed timestamps last).
    /// A missing directory is zero records, not an error.
    pub async fn load_all(&self) -> Result<Vec<Note>> {
        let mut entries = match fs::read_dir(&self.notes_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut notes = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable note file {}: {}", path.display(), e);
                    continue;
                }
            };
            notes.push(parse_note(stem, &content));
        }

        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }
}

/// Parse one note file. Never fails: a malformed title degrades to the
/// filename-derived id with an empty session id.
pub fn parse_note(file_stem: &str, content: &str) -> Note {
    let (first_line, rest) = match content.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (content, ""),
    };
    let title = first_line.trim_start_matches("# ").trim_end().to_string();
    let body = rest.trim().to_string();

    let parts: Vec<&str> = title.splitn(3, '-').collect();
    let (session_id, id) = if parts.len() == 3 && parts[0] == "Notes" {
        (parts[1].to_string(), parts[2].to_string())
    } else {
        (String::new(), file_stem.to_string())
    };

    Note {
        created_at: parse_timestamp(&id),
        id,
        session_id,
        title,
        body,
    }
}

fn parse_timestamp(id: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(id, ID_FORMAT).ok()?;
    Local.from_local_datetime(&naive).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_note_title_round_trips() {
        let note = Note::new("20240101T120000", "- a point");
        assert_eq!(note.title, format!("Notes-20240101T120000-{}", note.id));
        assert!(note.created_at.is_some());

        let parsed = parse_note(&note.id, &format!("# {}\n\n{}", note.title, note.body));
        assert_eq!(parsed.session_id, "20240101T120000");
        assert_eq!(parsed.id, note.id);
        assert_eq!(parsed.body, "- a point");
    }

    #[test]
    fn test_parse_well_formed_title() {
        let note = parse_note(
            "20240102T090000",
            "# Notes-20240101T120000-20240102T090000\n\n- one\n- two",
        );
        assert_eq!(note.session_id, "20240101T120000");
        assert_eq!(note.id, "20240102T090000");
        assert_eq!(note.body, "- one\n- two");
        assert!(note.created_at.is_some());
    }

    #[test]
    fn test_parse_falls_back_to_filename() {
        let note = parse_note("20240102T090000", "# Shopping list\n\nmilk");
        assert_eq!(note.id, "20240102T090000");
        assert_eq!(note.session_id, "");
        assert_eq!(note.title, "Shopping list");
        assert_eq!(note.body, "milk");
        assert!(note.created_at.is_some());
    }

    #[test]
    fn test_parse_unparseable_timestamp_loads_without_created_at() {
        let note = parse_note("scratch", "# scratch\n\nbody text");
        assert_eq!(note.id, "scratch");
        assert!(note.created_at.is_none());
        assert_eq!(note.body, "body text");
    }

    #[test]
    fn test_parse_title_only_file() {
        let note = parse_note("20240102T090000", "# Notes-a-b");
        assert_eq!(note.body, "");
    }

    #[test]
    fn test_parse_without_heading_marker() {
        // First-line title without the markdown prefix still parses.
        let note = parse_note(
            "20240102T090000",
            "Notes-20240101T120000-20240102T090000\n\nbody",
        );
        assert_eq!(note.session_id, "20240101T120000");
        assert_eq!(note.id, "20240102T090000");
    }
}
