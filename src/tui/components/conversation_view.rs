//! # ConversationPanel Component
//!
//! One conversation: a header naming the listing and the other party, the
//! message history pinned to the bottom, and the composer.
//!
//! Message heights are predicted with `textwrap` so only the newest lines
//! that fit are drawn; the view always sticks to the latest message.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::api::Message;
use crate::core::inbox::ConversationState;
use crate::tui::component::Component;
use crate::tui::components::{InputBox, spinner};

/// Messages take at most this share of the width, in percent.
const BUBBLE_WIDTH_PERCENT: usize = 70;

pub struct ConversationPanel<'a> {
    pub conversation: &'a ConversationState,
    pub user_id: &'a str,
    pub input: &'a mut InputBox,
    pub spinner_frame: usize,
}

impl<'a> ConversationPanel<'a> {
    pub fn new(
        conversation: &'a ConversationState,
        user_id: &'a str,
        input: &'a mut InputBox,
        spinner_frame: usize,
    ) -> Self {
        Self {
            conversation,
            user_id,
            input,
            spinner_frame,
        }
    }

    fn header(&self) -> Line<'static> {
        let title = self
            .conversation
            .listing
            .as_ref()
            .map(|l| l.title.clone())
            .unwrap_or_else(|| "Conversation".to_string());
        let other = self
            .conversation
            .other
            .as_ref()
            .map(|p| p.full_name())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.conversation.stub.other_user_id.clone());
        Line::from(vec![
            Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  with {other}"), Style::default().fg(Color::DarkGray)),
        ])
    }
}

/// Wraps each message to the bubble width; the user's own messages are
/// right-aligned.
pub(crate) fn message_lines(messages: &[Message], user_id: &str, width: u16) -> Vec<Line<'static>> {
    let bubble_width = (width as usize * BUBBLE_WIDTH_PERCENT / 100).max(8);
    let options = textwrap::Options::new(bubble_width)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);

    let mut lines = Vec::new();
    for message in messages {
        let mine = ConversationState::is_mine(message, user_id);
        let (style, meta) = if mine {
            (Style::default().fg(Color::Green), format!("you · {}", message.time_label()))
        } else {
            (Style::default().fg(Color::Cyan), message.time_label())
        };

        let mut block = vec![Line::styled(meta, Style::default().fg(Color::DarkGray))];
        block.extend(
            textwrap::wrap(message.text.trim(), &options)
                .into_iter()
                .map(|segment| Line::styled(segment.into_owned(), style)),
        );
        block.push(Line::default());

        if mine {
            lines.extend(block.into_iter().map(Line::right_aligned));
        } else {
            lines.extend(block);
        }
    }
    lines
}

impl Component for ConversationPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [header_area, messages_area, input_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(self.header()).block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(Color::DarkGray)),
            ),
            header_area,
        );

        let inner_width = messages_area.width.saturating_sub(2);
        let lines = if self.conversation.loading {
            vec![Line::styled(
                format!("{} Loading messages...", spinner(self.spinner_frame)),
                Style::default().fg(Color::DarkGray),
            )]
        } else if self.conversation.messages.is_empty() {
            vec![Line::styled(
                "No messages yet. Say hello!",
                Style::default().fg(Color::DarkGray),
            )]
        } else {
            message_lines(&self.conversation.messages, self.user_id, inner_width)
        };

        // Stick to the bottom: skip whatever doesn't fit above.
        let visible = messages_area.height as usize;
        let skip = lines.len().saturating_sub(visible);
        let history = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>());
        let [history_area] = Layout::horizontal([Constraint::Min(0)])
            .horizontal_margin(1)
            .areas(messages_area);
        frame.render_widget(history, history_area);

        self.input.title = if self.conversation.sending {
            " Sending... ".to_string()
        } else {
            " Message (Enter send, Esc back) ".to_string()
        };
        self.input.render(frame, input_area);
    }
}
