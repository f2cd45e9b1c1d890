//! # TitleBar Component
//!
//! Top bar: app name, screen tabs, signed-in user and the status message.
//!
//! Purely presentational; all fields are props:
//!
//! ```rust,ignore
//! TitleBar::new(app.screen, &app.user_id, &app.status_message).render(frame, area);
//! ```
//!
//! The conversation view is not a tab of its own; while it is open the
//! Inbox tab stays highlighted.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::state::Screen;
use crate::tui::component::Component;

const TABS: [Screen; 4] = [Screen::Feed, Screen::Search, Screen::Saved, Screen::Inbox];

pub struct TitleBar<'a> {
    pub screen: Screen,
    pub user_id: &'a str,
    pub status_message: &'a str,
}

impl<'a> TitleBar<'a> {
    pub fn new(screen: Screen, user_id: &'a str, status_message: &'a str) -> Self {
        Self {
            screen,
            user_id,
            status_message,
        }
    }

    fn is_active(&self, tab: Screen) -> bool {
        tab == self.screen || (tab == Screen::Inbox && self.screen == Screen::Conversation)
    }
}

impl Component for TitleBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            "Handdown ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )];

        for tab in TABS {
            let style = if self.is_active(tab) {
                Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {} ", tab.label()), style));
        }

        spans.push(Span::raw(format!(" | {}", self.user_id)));
        if !self.status_message.is_empty() {
            spans.push(Span::raw(format!(" | {}", self.status_message)));
        }

        frame.render_widget(Line::from(spans), area);
    }
}
