//! # SavedPanel Component
//!
//! Listings the user liked, one row each. Enter opens the listing overlay,
//! where a conversation can be started.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Paragraph};

use crate::core::saved::SavedState;
use crate::tui::component::Component;
use crate::tui::components::{spinner, tag_spans, truncate_str};

pub struct SavedPanel<'a> {
    pub saved: &'a SavedState,
    pub spinner_frame: usize,
}

impl<'a> SavedPanel<'a> {
    pub fn new(saved: &'a SavedState, spinner_frame: usize) -> Self {
        Self {
            saved,
            spinner_frame,
        }
    }
}

impl Component for SavedPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [list_area, help_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

        let busy = self.saved.loading || self.saved.removing.is_some();
        let title = if busy {
            format!(" Saved {} ", spinner(self.spinner_frame))
        } else {
            " Saved ".to_string()
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title);

        if self.saved.listings.is_empty() {
            let message = if self.saved.loaded {
                "Nothing saved yet. Swipe right on a listing to keep it here."
            } else {
                "Loading saved listings..."
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
                .saved
                .listings
                .iter()
                .enumerate()
                .map(|(i, listing)| {
                    let style = if i == self.saved.selected {
                        Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    } else {
                        Style::default()
                    };
                    let title = truncate_str(&listing.title, title_width);
                    let mut spans = vec![
                        Span::styled(format!("{:<width$}", title, width = title_width), style),
                        Span::styled(format!(" {:>7}  ", listing.price_label()), style),
                    ];
                    spans.extend(tag_spans(&listing.tags));
                    ListItem::new(Line::from(spans))
                })
                .collect();
            let mut list_state = ListState::default();
            list_state.select(Some(self.saved.selected));
            frame.render_stateful_widget(List::new(items).block(block), list_area, &mut list_state);
        }

        frame.render_widget(
            Paragraph::new("Enter open  ↑↓ select  d remove  r refresh  Tab screens  q quit")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            help_area,
        );
    }
}
