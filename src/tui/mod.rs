//! Terminal user interface
//!
//! Four mutually exclusive surfaces (session picker, chat, note browser,
//! note reader) driven by a single screen controller.

mod app;
mod chat;
mod input;
mod notes;
mod select;
mod theme;
mod widgets;

pub use app::{App, AppEvent};
pub use theme::Theme;
