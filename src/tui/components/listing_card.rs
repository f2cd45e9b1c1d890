//! # ListingCard Component
//!
//! One listing as a card: title in the border, then price and kind, the tag
//! chips, the description and the image reference.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Wrap};

use crate::api::{Listing, ListingType};
use crate::tui::component::Component;
use crate::tui::components::tag_spans;

pub struct ListingCard<'a> {
    pub listing: &'a Listing,
    /// Shown in the bottom border, e.g. "3 / 10"
    pub position: Option<String>,
    pub dimmed: bool,
}

impl<'a> ListingCard<'a> {
    pub fn new(listing: &'a Listing) -> Self {
        Self {
            listing,
            position: None,
            dimmed: false,
        }
    }

    pub fn position(mut self, index: usize, total: usize) -> Self {
        self.position = Some(format!(" {} / {} ", index + 1, total));
        self
    }

    pub fn dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }
}

/// The lines shared by the card and the listing overlay.
pub(crate) fn listing_lines(listing: &Listing) -> Vec<Line<'static>> {
    let kind = match listing.listing_type {
        ListingType::Listing => "Offer",
        ListingType::Request => "Request",
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                listing.price_label(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  ·  {}  ·  {}", listing.transaction_type, kind)),
        ]),
        Line::from(tag_spans(&listing.tags)),
        Line::default(),
    ];
    if listing.long_description.trim().is_empty() {
        lines.push(Line::styled(
            "No description.",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        lines.extend(
            listing
                .long_description
                .lines()
                .map(|line| Line::raw(line.to_string())),
        );
    }
    lines.push(Line::default());
    lines.push(match listing.image_ref() {
        Some(url) => Line::styled(format!("Image: {url}"), Style::default().fg(Color::Blue)),
        None => Line::styled("No image", Style::default().fg(Color::DarkGray)),
    });
    lines
}

impl Component for ListingCard<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Line::styled(
                format!(" {} ", self.listing.title),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .padding(Padding::horizontal(1));
        if let Some(position) = &self.position {
            block = block.title_bottom(Line::from(position.as_str()).right_aligned());
        }

        let card = Paragraph::new(listing_lines(self.listing))
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(card, area);
    }
}
