//! Shared widgets and transcript rendering for the TUI

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use regex::Regex;
use unicode_width::UnicodeWidthStr;

use crate::store::{Message, Role};

use super::theme::Theme;

/// Parse simple inline markdown and return styled spans.
/// Supports: **bold**, *italic*, `code`, ***bold italic***
fn parse_markdown(text: &str, base_style: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut remaining = text.to_string();

    let bold_italic = Regex::new(r"\*\*\*(.+?)\*\*\*").unwrap();
    let bold = Regex::new(r"\*\*(.+?)\*\*").unwrap();
    let italic = Regex::new(r"\*([^*]+?)\*").unwrap();
    let code = Regex::new(r"`([^`]+?)`").unwrap();

    let patterns: Vec<(&Regex, Style)> = vec![
        (
            &bold_italic,
            base_style.add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ),
        (&bold, base_style.add_modifier(Modifier::BOLD)),
        (&code, Style::default().fg(Color::Yellow)),
        (&italic, base_style.add_modifier(Modifier::ITALIC)),
    ];

    fn find_first_match(
        text: &str,
        patterns: &[(&Regex, Style)],
    ) -> Option<(usize, usize, String, Style)> {
        let mut best: Option<(usize, usize, String, Style)> = None;
        for (regex, style) in patterns {
            if let Some(m) = regex.find(text) {
                let better = match &best {
                    Some((start, _, _, _)) => m.start() < *start,
                    None => true,
                };
                if better {
                    if let Some(caps) = regex.captures(text) {
                        let inner = caps
                            .get(1)
                            .map(|c| c.as_str().to_string())
                            .unwrap_or_default();
                        best = Some((m.start(), m.end(), inner, *style));
                    }
                }
            }
        }
        best
    }

    while !remaining.is_empty() {
        if let Some((start, end, inner, style)) = find_first_match(&remaining, &patterns) {
            if start > 0 {
                spans.push(Span::styled(remaining[..start].to_string(), base_style));
            }
            spans.push(Span::styled(inner, style));
            remaining = remaining[end..].to_string();
        } else {
            spans.push(Span::styled(remaining.clone(), base_style));
            break;
        }
    }

    if spans.is_empty() {
        spans.push(Span::styled(text.to_string(), base_style));
    }

    spans
}

/// Wrap a long string into multiple lines, respecting unicode width.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 || text.width() <= max_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for c in text.chars() {
        let char_width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(1);

        if current_width + char_width > max_width && !current_line.is_empty() {
            lines.push(current_line);
            current_line = String::new();
            current_width = 0;
        }

        current_line.push(c);
        current_width += char_width;
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Render one chat message to display lines.
/// max_width: terminal width for wrapping (0 = no wrapping)
pub fn render_message_lines(msg: &Message, max_width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let content_width = max_width.saturating_sub(4);

    match msg.role {
        Role::System => {
            // System lines (injected notes, advisories) render dim italic,
            // without a badge.
            let style = Theme::dim().add_modifier(Modifier::ITALIC);
            for content_line in msg.content.lines() {
                for wrapped in wrap_text(content_line, content_width) {
                    lines.push(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(wrapped, style),
                    ]));
                }
            }
        }
        Role::User | Role::Assistant => {
            let (badge_text, badge_style) = match msg.role {
                Role::User => (" You ", Theme::user_badge()),
                _ => (" AI ", Theme::assistant_badge()),
            };
            lines.push(Line::from(Span::styled(badge_text, badge_style)));

            let use_markdown = msg.role == Role::Assistant;
            for content_line in msg.content.lines() {
                for (i, wrapped) in wrap_text(content_line, content_width).into_iter().enumerate() {
                    let indent = if i == 0 { "  " } else { "    " };
                    if use_markdown {
                        let mut spans = vec![Span::raw(indent.to_string())];
                        spans.extend(parse_markdown(&wrapped, Theme::text()));
                        lines.push(Line::from(spans));
                    } else {
                        lines.push(Line::from(vec![
                            Span::raw(indent.to_string()),
                            Span::styled(wrapped, Theme::text()),
                        ]));
                    }
                }
            }
        }
    }

    lines.push(Line::from(""));
    lines
}

/// Animated trailing dots for the pending indicator.
pub struct AnimatedDots {
    frame: usize,
}

impl AnimatedDots {
    pub fn new(frame: usize) -> Self {
        Self { frame }
    }

    pub fn current(&self) -> &'static str {
        const FRAMES: [&str; 4] = ["", ".", "..", "..."];
        FRAMES[self.frame % FRAMES.len()]
    }
}

/// Header bar with the app title and context on the right.
pub struct HeaderBar<'a> {
    pub title: &'a str,
    pub context: &'a str,
}

impl Widget for HeaderBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let title_line = Line::from(vec![
            Span::styled("◆ ", Theme::accent()),
            Span::styled(self.title, Theme::title()),
        ]);
        buf.set_line(area.x + 1, area.y, &title_line, area.width.saturating_sub(2));

        let context_str = format!("{} ", self.context);
        let context_len = context_str.width() as u16;
        let context_x = area.x + area.width.saturating_sub(context_len + 1);
        let context_span = Span::styled(context_str, Theme::muted());
        buf.set_span(context_x, area.y, &context_span, context_len + 1);
    }
}

/// Status bar showing whether a request is pending.
pub struct StatusBar {
    pub status_text: Option<String>,
    pub spinner_frame: usize,
}

impl Widget for StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = match self.status_text {
            Some(text) => {
                let dots = AnimatedDots::new(self.spinner_frame);
                Line::from(vec![Span::styled(
                    format!("{}{}", text, dots.current()),
                    Theme::accent(),
                )])
            }
            None => Line::from(vec![
                Span::styled("● ", Theme::success()),
                Span::styled("Ready", Theme::dim()),
            ]),
        };

        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));
    }
}

/// Input box widget
pub struct InputBox<'a> {
    pub content: &'a str,
    pub focused: bool,
}

impl Widget for InputBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(" Message ", Theme::muted()));

        let inner = block.inner(area);
        block.render(area, buf);

        let display_text = if self.content.is_empty() {
            "Type a message"
        } else {
            self.content
        };

        let style = if self.content.is_empty() {
            Theme::muted()
        } else {
            Theme::text()
        };

        let text = Paragraph::new(display_text)
            .style(style)
            .wrap(Wrap { trim: false });
        text.render(inner, buf);
    }
}

/// Help bar showing the active surface's key bindings.
pub struct HelpBar<'a> {
    pub bindings: &'a [(&'a str, &'a str)],
}

impl Widget for HelpBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::raw(" ")];
        for (i, (key, desc)) in self.bindings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", Theme::muted()));
            }
            spans.push(Span::styled(*key, Theme::key()));
            spans.push(Span::styled(format!(" {}", desc), Theme::key_desc()));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
