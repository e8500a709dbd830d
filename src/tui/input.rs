//! Line-editing input state for the chat surface

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key in the input line
#[derive(Debug, Clone)]
pub enum InputAction {
    /// Nothing the caller needs to act on
    None,
    /// Submit the current input (already taken out of the buffer)
    Submit(String),
    /// Quit the application
    Quit,
    /// Scroll the transcript up
    ScrollUp,
    /// Scroll the transcript down
    ScrollDown,
    /// Scroll a page at a time
    PageUp,
    /// Scroll a page at a time
    PageDown,
}

/// Input state manager
///
/// Note: `cursor` is a CHARACTER index, not a byte index, so editing never
/// splits a multi-byte character (e.g. CJK).
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub buffer: String,
    pub cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    fn char_to_byte_index(&self, char_idx: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_idx)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.buffer.len())
    }

    fn insert_char(&mut self, c: char) {
        let byte_idx = self.char_to_byte_index(self.cursor);
        self.buffer.insert(byte_idx, c);
        self.cursor += 1;
    }

    fn remove_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_idx = self.char_to_byte_index(self.cursor);
            if let Some((_, ch)) = self.buffer.char_indices().nth(self.cursor) {
                self.buffer
                    .replace_range(byte_idx..byte_idx + ch.len_utf8(), "");
            }
        }
    }

    fn remove_char_at_cursor(&mut self) {
        if self.cursor < self.char_count() {
            let byte_idx = self.char_to_byte_index(self.cursor);
            if let Some((_, ch)) = self.buffer.char_indices().nth(self.cursor) {
                self.buffer
                    .replace_range(byte_idx..byte_idx + ch.len_utf8(), "");
            }
        }
    }

    fn delete_word(&mut self) {
        while self.cursor > 0 {
            let prev = self.buffer.chars().nth(self.cursor - 1);
            if prev != Some(' ') {
                break;
            }
            self.remove_char_before_cursor();
        }
        while self.cursor > 0 {
            let prev = self.buffer.chars().nth(self.cursor - 1);
            if prev == Some(' ') {
                break;
            }
            self.remove_char_before_cursor();
        }
    }

    /// Handle a key event and return the action for the caller.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                InputAction::Quit
            }
            KeyCode::Esc => InputAction::Quit,

            KeyCode::Enter => {
                if self.buffer.trim().is_empty() {
                    // Trimmed-empty submissions are silently ignored.
                    InputAction::None
                } else {
                    let input = std::mem::take(&mut self.buffer);
                    self.cursor = 0;
                    InputAction::Submit(input)
                }
            }

            KeyCode::Backspace => {
                self.remove_char_before_cursor();
                InputAction::None
            }
            KeyCode::Delete => {
                self.remove_char_at_cursor();
                InputAction::None
            }

            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.buffer.clear();
                self.cursor = 0;
                InputAction::None
            }
            KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.delete_word();
                InputAction::None
            }

            KeyCode::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
                InputAction::None
            }
            KeyCode::Right => {
                if self.cursor < self.char_count() {
                    self.cursor += 1;
                }
                InputAction::None
            }
            KeyCode::Home => {
                self.cursor = 0;
                InputAction::None
            }
            KeyCode::End => {
                self.cursor = self.char_count();
                InputAction::None
            }
            KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.cursor = 0;
                InputAction::None
            }
            KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.cursor = self.char_count();
                InputAction::None
            }

            // Transcript scrolling
            KeyCode::Up => InputAction::ScrollUp,
            KeyCode::Down => InputAction::ScrollDown,
            KeyCode::PageUp => InputAction::PageUp,
            KeyCode::PageDown => InputAction::PageDown,

            KeyCode::Char(c) => {
                self.insert_char(c);
                InputAction::None
            }

            _ => InputAction::None,
        }
    }

    /// Cursor position in terminal columns, accounting for wide characters.
    pub fn cursor_display_width(&self) -> usize {
        self.buffer
            .chars()
            .take(self.cursor)
            .map(|c| unicode_width::UnicodeWidthChar::width(c).unwrap_or(1))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_insert_ascii() {
        let mut state = InputState::new();
        state.insert_char('h');
        state.insert_char('i');
        assert_eq!(state.buffer, "hi");
        assert_eq!(state.cursor, 2);
    }

    #[test]
    fn test_insert_unicode() {
        let mut state = InputState::new();
        state.insert_char('\u{4f60}');
        state.insert_char('\u{597d}');
        assert_eq!(state.buffer, "\u{4f60}\u{597d}");
        assert_eq!(state.cursor, 2);
        assert_eq!(state.char_count(), 2);
    }

    #[test]
    fn test_backspace_unicode() {
        let mut state = InputState::new();
        state.buffer = "\u{4f60}\u{597d}".to_string();
        state.cursor = 2;
        state.remove_char_before_cursor();
        assert_eq!(state.buffer, "\u{4f60}");
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn test_mid_buffer_insert() {
        let mut state = InputState::new();
        state.buffer = "hd".to_string();
        state.cursor = 1;
        state.insert_char('a');
        assert_eq!(state.buffer, "had");
        assert_eq!(state.cursor, 2);
    }

    #[test]
    fn test_submit_takes_buffer() {
        let mut state = InputState::new();
        state.buffer = "hello".to_string();
        state.cursor = 5;
        match state.handle_key(key(KeyCode::Enter)) {
            InputAction::Submit(text) => assert_eq!(text, "hello"),
            other => panic!("expected Submit, got {:?}", other),
        }
        assert!(state.buffer.is_empty());
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_whitespace_only_submit_ignored() {
        let mut state = InputState::new();
        state.buffer = "   ".to_string();
        state.cursor = 3;
        assert!(matches!(
            state.handle_key(key(KeyCode::Enter)),
            InputAction::None
        ));
        // Buffer is left alone so the user can keep editing.
        assert_eq!(state.buffer, "   ");
    }

    #[test]
    fn test_ctrl_w_deletes_word() {
        let mut state = InputState::new();
        state.buffer = "hello world  ".to_string();
        state.cursor = state.char_count();
        state.handle_key(ctrl('w'));
        assert_eq!(state.buffer, "hello ");
    }

    #[test]
    fn test_ctrl_u_clears() {
        let mut state = InputState::new();
        state.buffer = "hello".to_string();
        state.cursor = 3;
        state.handle_key(ctrl('u'));
        assert!(state.buffer.is_empty());
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_quit_keys() {
        let mut state = InputState::new();
        assert!(matches!(state.handle_key(ctrl('c')), InputAction::Quit));
        assert!(matches!(
            state.handle_key(key(KeyCode::Esc)),
            InputAction::Quit
        ));
    }

    #[test]
    fn test_cursor_display_width_wide_chars() {
        let mut state = InputState::new();
        state.buffer = "a\u{4f60}b".to_string();
        state.cursor = 2;
        // 'a' is 1 column, CJK char is 2.
        assert_eq!(state.cursor_display_width(), 3);
    }
}
