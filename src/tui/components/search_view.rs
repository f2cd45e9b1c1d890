//! # SearchPanel Component
//!
//! Query input on top, results below. Borrows the persistent `InputBox`
//! from `TuiState` for the frame.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use crate::core::search::SearchState;
use crate::tui::component::Component;
use crate::tui::components::{InputBox, spinner, tag_spans, truncate_str};

pub struct SearchPanel<'a> {
    pub search: &'a SearchState,
    pub input: &'a mut InputBox,
    pub spinner_frame: usize,
}

impl<'a> SearchPanel<'a> {
    pub fn new(search: &'a SearchState, input: &'a mut InputBox, spinner_frame: usize) -> Self {
        Self {
            search,
            input,
            spinner_frame,
        }
    }

    fn render_results(&self, frame: &mut Frame, area: Rect) {
        let muted = Style::default().fg(Color::DarkGray);
        if self.search.results.is_empty() {
            let message = if self.search.loading && self.search.is_browsing() {
                format!("{} Loading listings...", spinner(self.spinner_frame))
            } else if self.search.loading {
                format!("{} Searching...", spinner(self.spinner_frame))
            } else if self.search.searched {
                format!("No results for '{}'.", self.search.query)
            } else {
                "Search listings by keyword.".to_string()
            };
            frame.render_widget(
                Paragraph::new(message).style(muted).alignment(Alignment::Center),
                area,
            );
            return;
        }

        let title_width = (area.width as usize / 2).max(10);
        let items: Vec<ListItem> = self
            .search
            .results
            .iter()
            .enumerate()
            .map(|(i, listing)| {
                let style = if i == self.search.selected {
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
        list_state.select(Some(self.search.selected));
        frame.render_stateful_widget(List::new(items), area, &mut list_state);
    }
}

impl Component for SearchPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [input_area, results_area, help_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        self.input.render(frame, input_area);
        self.render_results(frame, results_area);

        let help = if self.search.loading && !self.search.results.is_empty() {
            format!("{} Searching...", spinner(self.spinner_frame))
        } else {
            "Enter search/open  ↑↓ select  ←/→ pass/like (empty input)  Esc feed".to_string()
        };
        frame.render_widget(
            Paragraph::new(help)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            help_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::listings;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(search: &SearchState) -> String {
        let backend = TestBackend::new(90, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut input = InputBox::new("Search", "Type a keyword");
        terminal
            .draw(|f| SearchPanel::new(search, &mut input, 0).render(f, f.area()))
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
    fn test_prompt_before_first_search() {
        let search = SearchState::new();
        assert!(render_text(&search).contains("Search listings by keyword"));
    }

    #[test]
    fn test_browse_page_loading() {
        let mut search = SearchState::new();
        search.browse();
        assert!(render_text(&search).contains("Loading listings..."));
    }

    #[test]
    fn test_no_results_message() {
        let mut search = SearchState::new();
        search.submit("unicorn");
        search.apply_results(Vec::new());
        assert!(render_text(&search).contains("No results for 'unicorn'"));
    }

    #[test]
    fn test_results_listed_with_tags() {
        let mut search = SearchState::new();
        search.submit("lamp");
        search.apply_results(listings(&["a", "b"]));
        let text = render_text(&search);
        assert!(text.contains("Listing a"));
        assert!(text.contains("Listing b"));
        assert!(text.contains("[Books]"));
    }
}
