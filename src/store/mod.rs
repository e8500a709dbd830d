//! Durable storage for sessions and notes
//!
//! One JSON file per session, one markdown file per note, both under the
//! user's data directory. No business logic lives here.

mod notes;
mod session;

pub use notes::{Note, NoteStore};
pub use session::{Message, Role, Session, SessionStore};

/// Timestamp shape shared by session and note identifiers.
pub const ID_FORMAT: &str = "%Y%m%dT%H%M%S";
