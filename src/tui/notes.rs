//! Note browser and note reader surfaces
//!
//! The browser lists persisted notes newest first; Enter opens the reader,
//! `a` hands the selected note back for injection, Esc cancels to chat.
//! The reader is read-only and scrollable.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::store::{Note, NoteStore};
use crate::Result;

use super::theme::Theme;
use super::widgets::{HeaderBar, HelpBar};

const BROWSER_HELP: &[(&str, &str)] = &[
    ("↑↓", "Move"),
    ("Enter", "View"),
    ("a", "Inject"),
    ("Esc", "Back"),
];

const READER_HELP: &[(&str, &str)] = &[("↑↓/PgUp/PgDn", "Scroll"), ("Esc", "Back")];

/// Outcome of one key on the note browser.
#[derive(Debug)]
pub enum BrowseAction {
    None,
    /// Open the reader on this note.
    View(Box<Note>),
    /// Hand the note to the controller for injection into the chat.
    Inject(Box<Note>),
    /// Return to chat without a selection.
    Cancel,
}

/// Note browser surface state.
pub struct NoteBrowser {
    notes: Vec<Note>,
    cursor: usize,
}

impl NoteBrowser {
    /// Load all persisted notes into a fresh browser.
    pub async fn load(store: &NoteStore) -> Result<Self> {
        Ok(Self {
            notes: store.load_all().await?,
            cursor: 0,
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> BrowseAction {
        match key.code {
            KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                BrowseAction::None
            }
            KeyCode::Down => {
                if self.cursor + 1 < self.notes.len() {
                    self.cursor += 1;
                }
                BrowseAction::None
            }
            KeyCode::Enter => match self.notes.get(self.cursor) {
                Some(note) => BrowseAction::View(Box::new(note.clone())),
                None => BrowseAction::None,
            },
            KeyCode::Char('a') => match self.notes.get(self.cursor) {
                Some(note) => BrowseAction::Inject(Box::new(note.clone())),
                None => BrowseAction::None,
            },
            KeyCode::Esc => BrowseAction::Cancel,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                BrowseAction::Cancel
            }
            _ => BrowseAction::None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        frame.render_widget(
            HeaderBar {
                title: "AI Notes",
                context: "Notes",
            },
            chunks[0],
        );

        let list_area = chunks[1];
        let mut lines = Vec::new();
        if self.notes.is_empty() {
            lines.push(Line::styled(
                "  No notes yet. Generate one from a chat with Ctrl+N.",
                Theme::muted(),
            ));
        } else {
            let visible = list_area.height as usize;
            let start = if self.cursor + 1 > visible {
                self.cursor + 1 - visible
            } else {
                0
            };
            for (i, note) in self
                .notes
                .iter()
                .enumerate()
                .skip(start)
                .take(visible)
            {
                let selected = i == self.cursor;
                let prefix = if selected { "> " } else { "  " };
                let style = if selected {
                    Theme::accent()
                } else {
                    Theme::text()
                };
                let created = note
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                lines.push(Line::from(vec![
                    Span::styled(prefix, style),
                    Span::styled(note.title.clone(), style),
                    Span::styled(format!(" ({})", created), Theme::muted()),
                ]));
            }
        }

        frame.render_widget(Paragraph::new(lines), list_area);
        frame.render_widget(
            HelpBar {
                bindings: BROWSER_HELP,
            },
            chunks[2],
        );
    }
}

/// Read-only full-text display of one note.
pub struct NoteReader {
    note: Note,
    scroll: u16,
}

impl NoteReader {
    pub fn new(note: Note) -> Self {
        Self { note, scroll: 0 }
    }

    /// Returns true when the reader should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                false
            }
            KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                false
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(5);
                false
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(5);
                false
            }
            _ => false,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Viewing ", Theme::muted()),
                Span::styled(self.note.title.clone(), Theme::title()),
            ])),
            chunks[0],
        );

        let body = Paragraph::new(self.note.body.clone())
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(body, chunks[1]);

        frame.render_widget(
            HelpBar {
                bindings: READER_HELP,
            },
            chunks[2],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn browser_with(notes: Vec<Note>) -> NoteBrowser {
        NoteBrowser { notes, cursor: 0 }
    }

    fn note(id: &str) -> Note {
        Note {
            id: id.to_string(),
            session_id: "20240101T000000".to_string(),
            title: format!("Notes-20240101T000000-{}", id),
            body: "body".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_navigation_clamps() {
        let mut browser = browser_with(vec![note("a"), note("b")]);
        browser.handle_key(key(KeyCode::Up));
        assert_eq!(browser.cursor, 0);
        browser.handle_key(key(KeyCode::Down));
        browser.handle_key(key(KeyCode::Down));
        browser.handle_key(key(KeyCode::Down));
        assert_eq!(browser.cursor, 1);
    }

    #[test]
    fn test_enter_views_selected_note() {
        let mut browser = browser_with(vec![note("a"), note("b")]);
        browser.handle_key(key(KeyCode::Down));
        match browser.handle_key(key(KeyCode::Enter)) {
            BrowseAction::View(selected) => assert_eq!(selected.id, "b"),
            other => panic!("expected View, got {:?}", other),
        }
        // The note stays listed for when the reader closes.
        assert_eq!(browser.notes.len(), 2);
    }

    #[test]
    fn test_inject_returns_selected_note() {
        let mut browser = browser_with(vec![note("a")]);
        match browser.handle_key(key(KeyCode::Char('a'))) {
            BrowseAction::Inject(selected) => assert_eq!(selected.id, "a"),
            other => panic!("expected Inject, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_browser_ignores_selection() {
        let mut browser = browser_with(Vec::new());
        assert!(matches!(
            browser.handle_key(key(KeyCode::Enter)),
            BrowseAction::None
        ));
        assert!(matches!(
            browser.handle_key(key(KeyCode::Char('a'))),
            BrowseAction::None
        ));
    }

    #[test]
    fn test_escape_cancels() {
        let mut browser = browser_with(vec![note("a")]);
        assert!(matches!(
            browser.handle_key(key(KeyCode::Esc)),
            BrowseAction::Cancel
        ));
    }

    #[test]
    fn test_reader_exit_and_scroll() {
        let mut reader = NoteReader::new(note("a"));
        assert!(!reader.handle_key(key(KeyCode::Down)));
        assert_eq!(reader.scroll, 1);
        assert!(!reader.handle_key(key(KeyCode::PageDown)));
        assert_eq!(reader.scroll, 6);
        assert!(!reader.handle_key(key(KeyCode::Up)));
        assert_eq!(reader.scroll, 5);
        assert!(reader.handle_key(key(KeyCode::Esc)));
        assert!(reader.handle_key(key(KeyCode::Char('q'))));
        assert!(reader.handle_key(key(KeyCode::Enter)));
    }
}
