//! # ProfileDetailView Component
//!
//! Overlay with a user's public profile and the listings they offer.
//! The selection lives in core (`ProfileDetail::selected`); the `ListState`
//! here is rebuilt from it each frame.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};

use crate::core::detail::{Loadable, ProfileDetail};
use crate::tui::component::Component;
use crate::tui::components::{centered_rect, spinner, tag_spans, truncate_str};

pub struct ProfileDetailView<'a> {
    pub detail: &'a ProfileDetail,
    pub spinner_frame: usize,
}

impl<'a> ProfileDetailView<'a> {
    pub fn new(detail: &'a ProfileDetail, spinner_frame: usize) -> Self {
        Self {
            detail,
            spinner_frame,
        }
    }
}

impl Component for ProfileDetailView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(70, 80, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Profile ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" ↑↓ Select  Enter Open  Esc Back ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let muted = Style::default().fg(Color::DarkGray);
        let content = match &self.detail.content {
            Loadable::Loading => {
                let text = format!("{} Loading profile...", spinner(self.spinner_frame));
                frame.render_widget(Paragraph::new(text).style(muted), inner);
                return;
            }
            Loadable::Failed => {
                frame.render_widget(Paragraph::new("Profile unavailable").style(muted), inner);
                return;
            }
            Loadable::Ready(content) => content,
        };

        let profile = &content.profile;
        let mut interests = vec![Span::raw("Interests: ")];
        interests.extend(tag_spans(&profile.interest_tags()));
        let mut offers = vec![Span::raw("Offers:    ")];
        offers.extend(tag_spans(&profile.offering_tags()));
        let header = vec![
            Line::styled(
                profile.full_name(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::styled(profile.email.clone(), muted),
            Line::from(interests),
            Line::from(offers),
            Line::default(),
            Line::styled(
                format!("Listings ({})", content.offerings.len()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ];
        let [header_area, list_area] =
            Layout::vertical([Constraint::Length(header.len() as u16), Constraint::Min(0)])
                .areas(inner);
        frame.render_widget(Paragraph::new(header), header_area);

        if content.offerings.is_empty() {
            frame.render_widget(Paragraph::new("No listings yet.").style(muted), list_area);
            return;
        }

        let title_width = (list_area.width as usize).saturating_sub(12);
        let items: Vec<ListItem> = content
            .offerings
            .iter()
            .enumerate()
            .map(|(i, listing)| {
                let style = if i == self.detail.selected {
                    Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let title = truncate_str(&listing.title, title_width);
                ListItem::new(Line::styled(
                    format!("{:<width$}  {}", title, listing.price_label(), width = title_width),
                    style,
                ))
            })
            .collect();
        let mut list_state = ListState::default();
        list_state.select(Some(self.detail.selected));
        frame.render_stateful_widget(List::new(items), list_area, &mut list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detail::ProfileContent;
    use crate::test_support::{listings, profile};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(detail: &ProfileDetail) -> String {
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| ProfileDetailView::new(detail, 0).render(f, f.area()))
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
    fn test_profile_shows_keywords_and_offerings() {
        let mut detail = ProfileDetail::new("p1".to_string());
        detail.content = Loadable::Ready(ProfileContent {
            profile: profile("Ada", "Lovelace"),
            offerings: listings(&["x", "y"]),
        });
        let text = render_text(&detail);
        assert!(text.contains("Ada Lovelace"));
        assert!(text.contains("[Books]"));
        assert!(text.contains("[Bikes]"));
        assert!(text.contains("[Tutoring]"));
        assert!(text.contains("Listings (2)"));
        assert!(text.contains("Listing x"));
    }

    #[test]
    fn test_profile_loading() {
        let detail = ProfileDetail::new("p1".to_string());
        assert!(render_text(&detail).contains("Loading profile"));
    }
}
