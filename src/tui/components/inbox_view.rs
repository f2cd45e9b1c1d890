//! # InboxPanel Component
//!
//! The user's conversations, one row each: listing title, the other party
//! and which side of the listing the user is on.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Paragraph};

use crate::core::inbox::InboxState;
use crate::tui::component::Component;
use crate::tui::components::{spinner, truncate_str};

pub struct InboxPanel<'a> {
    pub inbox: &'a InboxState,
    pub spinner_frame: usize,
}

impl<'a> InboxPanel<'a> {
    pub fn new(inbox: &'a InboxState, spinner_frame: usize) -> Self {
        Self {
            inbox,
            spinner_frame,
        }
    }
}

impl Component for InboxPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [list_area, help_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

        let title = if self.inbox.loading {
            format!(" Inbox {} ", spinner(self.spinner_frame))
        } else {
            " Inbox ".to_string()
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title);

        if self.inbox.entries.is_empty() {
            let message = if self.inbox.loaded {
                "No conversations yet. Superlike a listing to start one."
            } else {
                "Loading conversations..."
            };
            frame.render_widget(
                Paragraph::new(message)
                    .style(Style::default().fg(Color::DarkGray))
                    .alignment(Alignment::Center)
                    .block(block),
                list_area,
            );
        } else {
            let title_width = (list_area.width as usize / 2).max(10);
            let items: Vec<ListItem> = self
                .inbox
                .entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let style = if i == self.inbox.selected {
                        Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    } else {
                        Style::default()
                    };
                    let role = if entry.stub.is_offerer {
                        "you're offering"
                    } else {
                        "you asked"
                    };
                    let title = truncate_str(entry.title(), title_width);
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("{:<width$}", title, width = title_width), style),
                        Span::styled(format!("  {}", entry.counterpart()), style),
                        Span::styled(
                            format!("  ({role})"),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]))
                })
                .collect();
            let mut list_state = ListState::default();
            list_state.select(Some(self.inbox.selected));
            frame.render_stateful_widget(List::new(items).block(block), list_area, &mut list_state);
        }

        frame.render_widget(
            Paragraph::new("Enter open  ↑↓ select  d delete  r refresh  Tab screens  q quit")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            help_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ConversationSummary;
    use crate::core::inbox::inbox_entries;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(inbox: &InboxState) -> String {
        let backend = TestBackend::new(90, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| InboxPanel::new(inbox, 0).render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_empty_inbox_after_load() {
        let mut inbox = InboxState::new();
        inbox.apply_entries(Vec::new());
        assert!(render_text(&inbox).contains("No conversations yet"));
    }

    #[test]
    fn test_rows_show_title_and_counterpart() {
        let summary = ConversationSummary {
            conversation_id: "c1".to_string(),
            listing_id: "l1".to_string(),
            offering_user_id: "u2".to_string(),
            receiving_user_id: "u1".to_string(),
        };
        let mut entries = inbox_entries(&[summary], "u1");
        entries[0].listing_title = Some("Desk lamp".to_string());
        entries[0].other_name = Some("Grace Hopper".to_string());
        let mut inbox = InboxState::new();
        inbox.apply_entries(entries);

        let text = render_text(&inbox);
        assert!(text.contains("Desk lamp"));
        assert!(text.contains("Grace Hopper"));
        assert!(text.contains("you asked"));
    }
}
