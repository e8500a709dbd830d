//! Screen controller
//!
//! Owns the terminal and exactly one active surface at a time, as a sum
//! type over the four interactive modes. Keys go to the active surface;
//! surface outcomes drive transitions. Background gateway results re-enter
//! the loop as `AppEvent`s through a single channel and are applied to the
//! chat surface wherever it currently lives, so replies keep arriving while
//! the user browses notes.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::gateway::CompletionGateway;
use crate::store::{NoteStore, Session, SessionStore};
use crate::Result;

use super::chat::{ChatAction, ChatScreen};
use super::notes::{BrowseAction, NoteBrowser, NoteReader};
use super::select::{SelectAction, SessionPicker};

/// Typed results of background gateway calls, re-injected into the event
/// loop. Single producer per request, single consumer.
#[derive(Debug)]
pub enum AppEvent {
    CompletionReady(String),
    CompletionFailed(String),
    SummaryReady(String),
    SummaryFailed(String),
}

/// The four mutually exclusive interactive modes. The suspended chat rides
/// inside the Notes/View variants so the session survives transitions and
/// exactly one surface handles input.
enum Screen {
    Select(SessionPicker),
    Chat(ChatScreen),
    Notes(NoteBrowser, ChatScreen),
    View(NoteReader, NoteBrowser, ChatScreen),
}

impl Screen {
    fn chat_mut(&mut self) -> Option<&mut ChatScreen> {
        match self {
            Screen::Select(_) => None,
            Screen::Chat(chat) => Some(chat),
            Screen::Notes(_, chat) => Some(chat),
            Screen::View(_, _, chat) => Some(chat),
        }
    }

    fn into_session(self) -> Option<Session> {
        match self {
            Screen::Select(_) => None,
            Screen::Chat(chat) => Some(chat.into_session()),
            Screen::Notes(_, chat) => Some(chat.into_session()),
            Screen::View(_, _, chat) => Some(chat.into_session()),
        }
    }
}

/// Application state
pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    gateway: Arc<CompletionGateway>,
    session_store: SessionStore,
    note_store: NoteStore,
    model: String,
    screen: Option<Screen>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    spinner_frame: usize,
    should_quit: bool,
    terminal_restored: bool,
}

impl App {
    pub fn new(
        gateway: CompletionGateway,
        session_store: SessionStore,
        note_store: NoteStore,
        model: String,
        sessions: Vec<Session>,
    ) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            gateway: Arc::new(gateway),
            session_store,
            note_store,
            model,
            screen: Some(Screen::Select(SessionPicker::new(sessions))),
            events_tx,
            events_rx,
            spinner_frame: 0,
            should_quit: false,
            terminal_restored: false,
        })
    }

    /// Run the main event loop. On quit the terminal is restored first,
    /// then the active session (if any) is saved best-effort.
    pub async fn run(&mut self) -> Result<()> {
        let poll_timeout = Duration::from_millis(16);
        let spinner_interval = Duration::from_millis(250);
        let mut last_spinner_update = std::time::Instant::now();

        while !self.should_quit {
            self.drain_events().await;

            if last_spinner_update.elapsed() >= spinner_interval {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
                last_spinner_update = std::time::Instant::now();
            }

            self.draw()?;

            if event::poll(poll_timeout)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key).await;
                }
            }
        }

        self.restore_terminal();
        self.save_active_session().await;
        Ok(())
    }

    /// Apply queued background results to the chat surface wherever it
    /// lives. Results arriving with no chat bound (post-quit drain) are
    /// dropped, matching the no-cancellation contract.
    async fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            if let Some(chat) = self.screen.as_mut().and_then(Screen::chat_mut) {
                chat.apply_event(event, &self.note_store).await;
            }
        }
    }

    async fn handle_key(&mut self, key: event::KeyEvent) {
        let Some(screen) = self.screen.take() else {
            return;
        };

        let next = match screen {
            Screen::Select(mut picker) => {
                match picker.handle_key(key, &self.session_store).await {
                    SelectAction::Open(session) => {
                        info!("Opening session {}", session.id);
                        Screen::Chat(ChatScreen::new(*session, self.model.clone()))
                    }
                    SelectAction::Quit => {
                        self.should_quit = true;
                        Screen::Select(picker)
                    }
                    SelectAction::None => Screen::Select(picker),
                }
            }
            Screen::Chat(mut chat) => {
                match chat.handle_key(key, &self.gateway, &self.events_tx).await {
                    ChatAction::BrowseNotes => match NoteBrowser::load(&self.note_store).await {
                        Ok(browser) => Screen::Notes(browser, chat),
                        Err(e) => {
                            chat.report_error(format!("Error loading notes: {}", e));
                            Screen::Chat(chat)
                        }
                    },
                    ChatAction::Quit => {
                        self.should_quit = true;
                        Screen::Chat(chat)
                    }
                    ChatAction::None => Screen::Chat(chat),
                }
            }
            Screen::Notes(mut browser, mut chat) => match browser.handle_key(key) {
                BrowseAction::View(note) => Screen::View(NoteReader::new(*note), browser, chat),
                BrowseAction::Inject(note) => {
                    chat.inject_note(&note);
                    Screen::Chat(chat)
                }
                BrowseAction::Cancel => Screen::Chat(chat),
                BrowseAction::None => Screen::Notes(browser, chat),
            },
            Screen::View(mut reader, browser, chat) => {
                if reader.handle_key(key) {
                    Screen::Notes(browser, chat)
                } else {
                    Screen::View(reader, browser, chat)
                }
            }
        };

        self.screen = Some(next);
    }

    fn draw(&mut self) -> io::Result<()> {
        let Self {
            terminal,
            screen,
            spinner_frame,
            ..
        } = self;
        terminal.draw(|frame| {
            let area = frame.area();
            match screen.as_mut() {
                Some(Screen::Select(picker)) => picker.render(frame, area),
                Some(Screen::Chat(chat)) => chat.render(frame, area, *spinner_frame),
                Some(Screen::Notes(browser, _)) => browser.render(frame, area),
                Some(Screen::View(reader, _, _)) => reader.render(frame, area),
                None => {}
            }
        })?;
        Ok(())
    }

    /// Persist the active session, if one was ever bound. Failure is
    /// reported but never blocks exit.
    async fn save_active_session(&mut self) {
        let Some(session) = self.screen.take().and_then(Screen::into_session) else {
            return;
        };
        match self.session_store.save(&session).await {
            Ok(()) => info!("Saved session {} on exit", session.id),
            Err(e) => {
                warn!("Failed to save session {} on exit: {}", session.id, e);
                eprintln!("warning: failed to save session {}: {}", session.id, e);
            }
        }
    }

    fn restore_terminal(&mut self) {
        if self.terminal_restored {
            return;
        }
        self.terminal_restored = true;
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.restore_terminal();
    }
}
