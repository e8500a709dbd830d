//! Session selection surface
//!
//! Row 0 is the "New session" sentinel; rows 1..N are the persisted
//! sessions, newest first. Deleting a row is irreversible and clamps the
//! cursor to the new bounds.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    Frame,
};
use tracing::warn;

use crate::store::{Session, SessionStore};

use super::theme::Theme;
use super::widgets::{HeaderBar, HelpBar};

const HELP: &[(&str, &str)] = &[
    ("↑↓", "Move"),
    ("Enter", "Open"),
    ("d", "Delete"),
    ("Esc", "Quit"),
];

/// Outcome of one key on the selection surface.
#[derive(Debug)]
pub enum SelectAction {
    None,
    /// Session chosen (fresh or resumed); bind it to the chat surface.
    Open(Box<Session>),
    Quit,
}

/// Selection surface state.
pub struct SessionPicker {
    sessions: Vec<Session>,
    cursor: usize,
}

impl SessionPicker {
    /// `sessions` must already be sorted newest first (the store does this).
    pub fn new(sessions: Vec<Session>) -> Self {
        Self {
            sessions,
            cursor: 0,
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent, store: &SessionStore) -> SelectAction {
        match key.code {
            KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                SelectAction::None
            }
            KeyCode::Down => {
                if self.cursor < self.sessions.len() {
                    self.cursor += 1;
                }
                SelectAction::None
            }
            KeyCode::Enter => {
                if self.cursor == 0 {
                    SelectAction::Open(Box::new(Session::new()))
                } else {
                    // Resume the stored session unchanged; once in chat there
                    // is no way back here, so hand over ownership.
                    let session = self.sessions.remove(self.cursor - 1);
                    SelectAction::Open(Box::new(session))
                }
            }
            KeyCode::Char('d') => {
                self.delete_under_cursor(store).await;
                SelectAction::None
            }
            KeyCode::Esc => SelectAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                SelectAction::Quit
            }
            _ => SelectAction::None,
        }
    }

    /// Delete the session under the cursor. The sentinel row is not
    /// deletable. A failed file removal still drops the row from the list.
    async fn delete_under_cursor(&mut self, store: &SessionStore) {
        if self.cursor == 0 || self.cursor > self.sessions.len() {
            return;
        }
        let idx = self.cursor - 1;
        let id = self.sessions[idx].id.clone();
        if let Err(e) = store.delete(&id).await {
            warn!("Failed to delete session {}: {}", id, e);
        }
        self.sessions.remove(idx);
        self.cursor = self.cursor.min(self.sessions.len());
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
                context: "Select a session",
            },
            chunks[0],
        );

        let list_area = chunks[1];
        let visible = list_area.height as usize;
        let total_rows = self.sessions.len() + 1;
        let start = if self.cursor + 1 > visible {
            self.cursor + 1 - visible
        } else {
            0
        };

        let mut lines = Vec::new();
        for row in start..total_rows.min(start + visible) {
            let selected = row == self.cursor;
            let prefix = if selected { "> " } else { "  " };
            let style = if selected {
                Theme::accent()
            } else {
                Theme::text()
            };
            let line = if row == 0 {
                Line::from(vec![
                    Span::styled(prefix, style),
                    Span::styled("New session", style),
                ])
            } else {
                let session = &self.sessions[row - 1];
                Line::from(vec![
                    Span::styled(prefix, style),
                    Span::styled(session.id.clone(), style),
                    Span::styled(
                        format!(" ({})", session.created_at.format("%Y-%m-%d %H:%M:%S")),
                        Theme::muted(),
                    ),
                ])
            };
            lines.push(line);
        }

        frame.render_widget(ratatui::widgets::Paragraph::new(lines), list_area);
        frame.render_widget(HelpBar { bindings: HELP }, chunks[2]);
    }
}
