//! # ListingDetailView Component
//!
//! Overlay with the full listing and its offerer. Transient: created each
//! frame from the `ListingDetail` on top of the overlay stack.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::core::detail::{ListingDetail, Loadable};
use crate::tui::component::Component;
use crate::tui::components::centered_rect;
use crate::tui::components::listing_card::listing_lines;

pub struct ListingDetailView<'a> {
    pub detail: &'a ListingDetail,
    pub spinner_frame: usize,
}

impl<'a> ListingDetailView<'a> {
    pub fn new(detail: &'a ListingDetail, spinner_frame: usize) -> Self {
        Self {
            detail,
            spinner_frame,
        }
    }

    fn offerer_lines(&self) -> Vec<Line<'static>> {
        let heading = Line::styled("Offered by", Style::default().add_modifier(Modifier::BOLD));
        let muted = Style::default().fg(Color::DarkGray);
        let body = match &self.detail.offerer {
            None => vec![Line::styled("Unknown offerer", muted)],
            Some(Loadable::Loading) => vec![Line::styled(
                format!("{} Loading profile...", super::spinner(self.spinner_frame)),
                muted,
            )],
            Some(Loadable::Failed) => vec![Line::styled("Profile unavailable", muted)],
            Some(Loadable::Ready(profile)) => {
                let name = profile.full_name();
                let mut lines = vec![Line::raw(if name.is_empty() {
                    "Unnamed user".to_string()
                } else {
                    name
                })];
                if !profile.email.is_empty() {
                    lines.push(Line::styled(profile.email.clone(), muted));
                }
                lines
            }
        };
        let mut lines = vec![Line::default(), heading];
        lines.extend(body);
        lines
    }
}

impl Component for ListingDetailView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(70, 80, area);
        frame.render_widget(Clear, overlay);

        let help = match (self.detail.listing.offerer_id().is_some(), self.detail.from_feed) {
            (true, true) => " p Offerer profile  Esc Close ",
            (true, false) => " p Offerer profile  c Start chat  Esc Close ",
            (false, _) => " Esc Close ",
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", self.detail.listing.title))
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(help).centered())
            .padding(Padding::horizontal(1));

        let mut lines = listing_lines(&self.detail.listing);
        lines.extend(self.offerer_lines());

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            overlay,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{listing, profile};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(detail: &ListingDetail) -> String {
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| ListingDetailView::new(detail, 0).render(f, f.area()))
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
    fn test_detail_shows_tags_and_loading_offerer() {
        let detail = ListingDetail::new(listing("a"), true);
        let text = render_text(&detail);
        assert!(text.contains("[Books]"));
        assert!(text.contains("[Furniture]"));
        assert!(text.contains("Loading profile"));
    }

    #[test]
    fn test_detail_shows_offerer_name() {
        let detail = ListingDetail::with_offerer(listing("a"), profile("Ada", "Lovelace"));
        let text = render_text(&detail);
        assert!(text.contains("Ada Lovelace"));
        assert!(text.contains("ada@campus.test"));
    }

    #[test]
    fn test_chat_hint_outside_the_feed() {
        assert!(!render_text(&ListingDetail::new(listing("a"), true)).contains("Start chat"));
        assert!(render_text(&ListingDetail::new(listing("a"), false)).contains("c Start chat"));
    }

    #[test]
    fn test_detail_failed_offerer() {
        let mut detail = ListingDetail::new(listing("a"), true);
        detail.offerer = Some(Loadable::Failed);
        assert!(render_text(&detail).contains("Profile unavailable"));
    }
}
