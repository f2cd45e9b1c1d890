//! # InputBox Component
//!
//! Single-line text input used by the search screen and the conversation view.
//!
//! The buffer and cursor are internal state. Title, placeholder and focus are
//! props set by the parent each frame. Text wider than the box scrolls
//! horizontally so the cursor stays visible; widths are measured in terminal
//! cells, so wide characters take two.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Border (2) + padding (2) consumed horizontally by the bordered block
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Offset from area edge to content (border + padding)
const CONTENT_OFFSET: u16 = 2;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter on non-blank text; the buffer is cleared.
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    pub title: String,
    pub placeholder: String,
    pub focused: bool,
    /// Byte offset into `buffer`
    cursor: usize,
}

impl InputBox {
    pub fn new(title: &str, placeholder: &str) -> Self {
        Self {
            buffer: String::new(),
            title: title.to_string(),
            placeholder: placeholder.to_string(),
            focused: true,
            cursor: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// The part of the buffer that fits in `width` cells, plus the cursor
    /// column within it.
    fn visible(&self, width: usize) -> (&str, usize) {
        let before = &self.buffer[..self.cursor];
        let mut start = 0;
        let mut cursor_col = before.width();
        // Leave one cell for the cursor itself.
        for (i, c) in before.char_indices() {
            if cursor_col < width.max(1) {
                break;
            }
            cursor_col -= c.width().unwrap_or(0);
            start = i + c.len_utf8();
        }
        (&self.buffer[start..], cursor_col)
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner = area.width.saturating_sub(HORIZONTAL_OVERHEAD) as usize;
        let border_style = if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title.as_str())
            .padding(ratatui::widgets::Padding::horizontal(1));

        if self.buffer.is_empty() {
            let placeholder = Paragraph::new(self.placeholder.as_str())
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
                .block(block);
            frame.render_widget(placeholder, area);
            if self.focused {
                frame.set_cursor_position((area.x + CONTENT_OFFSET, area.y + 1));
            }
            return;
        }

        let (text, cursor_col) = self.visible(inner);
        let input = Paragraph::new(text.to_string()).block(block);
        frame.render_widget(input, area);

        if self.focused {
            frame.set_cursor_position((area.x + CONTENT_OFFSET + cursor_col as u16, area.y + 1));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut buf = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut buf));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Single line: newlines become spaces.
                let flattened: String = text
                    .chars()
                    .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                    .collect();
                self.insert_str(&flattened);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                let prev = self.buffer[..self.cursor].char_indices().next_back()?.0;
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => {
                self.cursor = self.buffer[..self.cursor].char_indices().next_back()?.0;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorRight => {
                let c = self.buffer[self.cursor..].chars().next()?;
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}
