//! # FeedPanel Component
//!
//! Body of the feed screen. Draws whatever the feed state machine is in:
//! a spinner while fetching, a gauge while images preload, the current card
//! with the swipe hints, the superlike confirmation, or an end-of-feed
//! message.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Gauge, Paragraph, Wrap};

use crate::core::feed::{FeedEnd, FeedSession, FeedView};
use crate::tui::component::Component;
use crate::tui::components::{ListingCard, centered_rect, spinner};

pub struct FeedPanel<'a> {
    pub feed: &'a FeedSession,
    pub spinner_frame: usize,
}

impl<'a> FeedPanel<'a> {
    pub fn new(feed: &'a FeedSession, spinner_frame: usize) -> Self {
        Self {
            feed,
            spinner_frame,
        }
    }

    fn render_centered(&self, frame: &mut Frame, area: Rect, lines: Vec<Line>) {
        let height = lines.len() as u16;
        let [_, middle, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .areas(area);
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, middle);
    }

    fn render_preloading(&self, frame: &mut Frame, area: Rect) {
        let total = self.feed.listings().len();
        let settled = self.feed.images_settled();
        let ratio = if total == 0 {
            0.0
        } else {
            settled as f64 / total as f64
        };
        let [_, gauge_area, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .areas(centered_rect(60, 100, area));
        let gauge = Gauge::default()
            .block(Block::bordered().border_type(BorderType::Rounded).title(" Loading images "))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(ratio.clamp(0.0, 1.0))
            .label(format!("{settled}/{total}"));
        frame.render_widget(gauge, gauge_area);
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, index: usize, dimmed: bool) {
        let [card_area, hint_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        if let Some(listing) = self.feed.listing(index) {
            ListingCard::new(listing)
                .position(index, self.feed.listings().len())
                .dimmed(dimmed)
                .render(frame, centered_rect(80, 100, card_area));
        }

        let hint = if self.feed.superlike_pending() {
            Line::from(format!("{} Starting a conversation...", spinner(self.spinner_frame)))
        } else {
            hint_line()
        };
        frame.render_widget(Paragraph::new(hint).alignment(Alignment::Center), hint_area);
    }

    fn render_confirmation(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup);
        let lines = vec![
            Line::styled(
                "You superliked this listing!",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::raw("A conversation with the offerer has started."),
            Line::default(),
            Line::from(vec![
                Span::styled("Enter", Style::default().fg(Color::Cyan)),
                Span::raw(" Open chat   "),
                Span::styled("Esc", Style::default().fg(Color::Cyan)),
                Span::raw(" Keep browsing"),
            ]),
        ];
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" Conversation started ");
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            popup,
        );
    }
}

fn hint_line() -> Line<'static> {
    let key = Style::default().fg(Color::Cyan);
    Line::from(vec![
        Span::styled("←", key),
        Span::raw(" pass  "),
        Span::styled("→", key),
        Span::raw(" like  "),
        Span::styled("↓", key),
        Span::raw(" superlike  "),
        Span::styled("↑", key),
        Span::raw(" details  "),
        Span::styled("r", key),
        Span::raw(" refresh"),
    ])
}

fn end_lines(end: &FeedEnd) -> Vec<Line<'static>> {
    let (headline, hint) = match end {
        FeedEnd::Exhausted => (
            "You've seen every listing.",
            "Press Enter to show them again, or r to refresh.",
        ),
        FeedEnd::Empty => (
            "No listings right now.",
            "Press Enter to check again.",
        ),
        FeedEnd::Failed(_) => (
            "The feed couldn't be loaded.",
            "Press Enter to try again.",
        ),
    };
    vec![
        Line::styled(headline, Style::default().add_modifier(Modifier::BOLD)),
        Line::default(),
        Line::styled(hint, Style::default().fg(Color::DarkGray)),
    ]
}

impl Component for FeedPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        match self.feed.view() {
            FeedView::Loading => {
                let line = Line::from(format!(
                    "{} Loading listings...",
                    spinner(self.spinner_frame)
                ));
                self.render_centered(frame, area, vec![line]);
            }
            FeedView::Preloading => self.render_preloading(frame, area),
            FeedView::Browsing { index } => self.render_card(frame, area, *index, false),
            FeedView::Expanded { index } => self.render_card(frame, area, *index, true),
            FeedView::Confirming { index, .. } => {
                self.render_card(frame, area, *index, true);
                self.render_confirmation(frame, area);
            }
            FeedView::EndOfFeed(end) => self.render_centered(frame, area, end_lines(end)),
        }
    }
}
