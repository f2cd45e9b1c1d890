//! # AlertPopup Component
//!
//! Modal error notice drawn above everything else. Shows the oldest queued
//! alert; `remaining` counts the ones waiting behind it.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};

use crate::tui::component::Component;
use crate::tui::components::centered_rect;

pub struct AlertPopup<'a> {
    pub message: &'a str,
    pub remaining: usize,
}

impl<'a> AlertPopup<'a> {
    pub fn new(message: &'a str, remaining: usize) -> Self {
        Self { message, remaining }
    }
}

impl Component for AlertPopup<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup);

        let footer = if self.remaining > 0 {
            format!(" Enter/Esc dismiss ({} more) ", self.remaining)
        } else {
            " Enter/Esc dismiss ".to_string()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red))
            .title(Line::styled(
                " Something went wrong ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Line::from(footer).centered())
            .padding(Padding::uniform(1));

        frame.render_widget(
            Paragraph::new(self.message)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block),
            popup,
        );
    }
}
