//! Chat surface
//!
//! Owns the active session's message log. Submissions and note generation
//! run as background gateway calls; their outcomes come back through the
//! app's event channel and are applied here, on the loop thread. Errors are
//! folded into the transcript as assistant lines and never abort the
//! surface.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    Frame,
};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::gateway::{ChatMessage, CompletionGateway};
use crate::store::{Message, Note, NoteStore, Session};

use super::app::AppEvent;
use super::input::{InputAction, InputState};
use super::widgets::{render_message_lines, HeaderBar, HelpBar, InputBox, StatusBar};

const WELCOME: &str = "Welcome to AI Notes!";

const SUMMARIZE_INSTRUCTION: &str =
    "Please summarize the following conversation into concise bullet-point notes.";

const GENERATING_NOTICE: &str = "Generating notes...";

const BUSY_NOTICE: &str = "A request is still in flight; wait for it to finish.";

const HELP: &[(&str, &str)] = &[
    ("Enter", "Send"),
    ("Ctrl+N", "Notes"),
    ("Ctrl+L", "Browse"),
    ("↑↓", "Scroll"),
    ("Esc", "Quit"),
];

/// Outcome of one key on the chat surface, for the controller.
#[derive(Debug)]
pub enum ChatAction {
    None,
    BrowseNotes,
    Quit,
}

/// Which gateway call is outstanding. At most one per session; new requests
/// are rejected until it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Completion,
    Summary,
}

/// Chat surface state.
pub struct ChatScreen {
    session: Session,
    input: InputState,
    scroll_offset: usize,
    pending: Option<Pending>,
    model: String,
}

impl ChatScreen {
    /// Bind a session. A genuinely new session (empty chat) is seeded with a
    /// single welcome message; resumed history is left untouched.
    pub fn new(session: Session, model: String) -> Self {
        let mut session = session;
        if session.chat.is_empty() {
            session.chat.push(Message::assistant(WELCOME));
        }
        Self {
            session,
            input: InputState::new(),
            scroll_offset: 0,
            pending: None,
            model,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub async fn handle_key(
        &mut self,
        key: KeyEvent,
        gateway: &Arc<CompletionGateway>,
        events_tx: &mpsc::UnboundedSender<AppEvent>,
    ) -> ChatAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('l') => return ChatAction::BrowseNotes,
                KeyCode::Char('n') => {
                    if self.begin_summary() {
                        self.spawn_request(self.summary_request(), true, gateway, events_tx);
                    }
                    return ChatAction::None;
                }
                _ => {}
            }
        }

        match self.input.handle_key(key) {
            InputAction::Quit => ChatAction::Quit,
            InputAction::Submit(text) => {
                if self.accept_submission(text) {
                    self.spawn_request(self.wire_history(), false, gateway, events_tx);
                }
                ChatAction::None
            }
            InputAction::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                ChatAction::None
            }
            InputAction::ScrollDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                ChatAction::None
            }
            InputAction::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_add(10);
                ChatAction::None
            }
            InputAction::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
                ChatAction::None
            }
            InputAction::None => ChatAction::None,
        }
    }

    /// Record a user submission. Returns true when a completion request
    /// should be issued. While another request is pending the draft goes
    /// back into the input buffer and only an advisory line is appended.
    fn accept_submission(&mut self, text: String) -> bool {
        if self.pending.is_some() {
            self.input.cursor = text.chars().count();
            self.input.buffer = text;
            self.session.chat.push(Message::system(BUSY_NOTICE));
            self.scroll_to_bottom();
            return false;
        }
        self.session.chat.push(Message::user(text));
        self.pending = Some(Pending::Completion);
        self.scroll_to_bottom();
        true
    }

    /// Append the transient "generating" marker and mark a summary request
    /// pending. Returns true when the request should be issued.
    fn begin_summary(&mut self) -> bool {
        if self.pending.is_some() {
            self.session.chat.push(Message::system(BUSY_NOTICE));
            self.scroll_to_bottom();
            return false;
        }
        self.session.chat.push(Message::assistant(GENERATING_NOTICE));
        self.pending = Some(Pending::Summary);
        self.scroll_to_bottom();
        true
    }

    /// The full ordered history, roles mapped verbatim onto the wire.
    fn wire_history(&self) -> Vec<ChatMessage> {
        self.session
            .chat
            .iter()
            .map(|m| ChatMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect()
    }

    /// Summary request: the fixed instruction, then the full history.
    fn summary_request(&self) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage {
            role: "system".to_string(),
            content: SUMMARIZE_INSTRUCTION.to_string(),
        }];
        messages.extend(self.wire_history());
        messages
    }

    fn spawn_request(
        &self,
        messages: Vec<ChatMessage>,
        summary: bool,
        gateway: &Arc<CompletionGateway>,
        events_tx: &mpsc::UnboundedSender<AppEvent>,
    ) {
        let gateway = Arc::clone(gateway);
        let events_tx = events_tx.clone();
        let model = self.model.clone();
        tokio::spawn(async move {
            let event = match gateway.complete(&messages, &model).await {
                Ok(text) if summary => AppEvent::SummaryReady(text),
                Ok(text) => AppEvent::CompletionReady(text),
                Err(e) if summary => AppEvent::SummaryFailed(e.to_string()),
                Err(e) => AppEvent::CompletionFailed(e.to_string()),
            };
            // The receiver is gone only during shutdown; the result is
            // abandoned then.
            let _ = events_tx.send(event);
        });
    }

    /// Apply a background result. Note persistence happens here, on the
    /// loop thread, never inside the background task.
    pub async fn apply_event(&mut self, event: AppEvent, notes: &NoteStore) {
        match event {
            AppEvent::CompletionReady(text) => {
                self.pending = None;
                self.session.chat.push(Message::assistant(text));
            }
            AppEvent::CompletionFailed(reason) => {
                self.pending = None;
                error!("Completion failed: {}", reason);
                self.session
                    .chat
                    .push(Message::assistant(format!("Error: {}", reason)));
            }
            AppEvent::SummaryReady(summary) => {
                self.pending = None;
                let note = Note::new(&self.session.id, summary.clone());
                match notes.save(&note).await {
                    Ok(path) => {
                        debug!("Note {} saved for session {}", note.id, self.session.id);
                        self.session.chat.push(Message::assistant(summary));
                        self.session.chat.push(Message::assistant(format!(
                            "Notes saved to {}",
                            path.display()
                        )));
                    }
                    Err(e) => {
                        error!("Note save failed: {}", e);
                        self.session
                            .chat
                            .push(Message::assistant(format!("Error saving notes: {}", e)));
                    }
                }
            }
            AppEvent::SummaryFailed(reason) => {
                self.pending = None;
                error!("Summary failed: {}", reason);
                self.session.chat.push(Message::assistant(format!(
                    "Error generating notes: {}",
                    reason
                )));
            }
        }
        self.scroll_to_bottom();
    }

    /// Copy a note into the chat: its body as a system message, then an
    /// assistant confirmation naming it.
    pub fn inject_note(&mut self, note: &Note) {
        self.session.chat.push(Message::system(note.body.clone()));
        self.session
            .chat
            .push(Message::assistant(format!("Injected notes: {}", note.title)));
        self.scroll_to_bottom();
    }

    /// Fold a local failure (e.g. the note list failing to load) into the
    /// transcript.
    pub fn report_error(&mut self, text: impl Into<String>) {
        self.session.chat.push(Message::assistant(text.into()));
        self.scroll_to_bottom();
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    fn status_text(&self) -> Option<String> {
        match self.pending {
            Some(Pending::Completion) => Some("Waiting for reply".to_string()),
            Some(Pending::Summary) => Some("Generating notes".to_string()),
            None => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, spinner_frame: usize) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        frame.render_widget(
            HeaderBar {
                title: "AI Notes",
                context: &self.session.id,
            },
            chunks[0],
        );

        let transcript_area = chunks[1];
        let width = transcript_area.width as usize;
        let mut lines: Vec<Line> = Vec::new();
        for msg in &self.session.chat {
            lines.extend(render_message_lines(msg, width));
        }

        let visible = transcript_area.height as usize;
        let max_offset = lines.len().saturating_sub(visible);
        self.scroll_offset = self.scroll_offset.min(max_offset);
        let start = lines.len().saturating_sub(visible + self.scroll_offset);
        let window: Vec<Line> = lines.into_iter().skip(start).take(visible).collect();
        frame.render_widget(ratatui::widgets::Paragraph::new(window), transcript_area);

        frame.render_widget(
            StatusBar {
                status_text: self.status_text(),
                spinner_frame,
            },
            chunks[2],
        );

        let input_area = chunks[3];
        frame.render_widget(
            InputBox {
                content: &self.input.buffer,
                focused: true,
            },
            input_area,
        );
        let cursor_x = input_area.x + 1 + self.input.cursor_display_width() as u16;
        let max_x = input_area.x + input_area.width.saturating_sub(2);
        frame.set_cursor_position((cursor_x.min(max_x), input_area.y + 1));

        frame.render_widget(HelpBar { bindings: HELP }, chunks[4]);
    }
}
