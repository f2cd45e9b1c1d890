//! # TUI Components
//!
//! This module contains all UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as struct fields and are
//! created fresh each frame:
//! - `TitleBar`: Top bar with screen tabs, user and status
//! - `ListingCard`: One listing on the feed
//! - `FeedPanel`, `SavedPanel`, `InboxPanel`: Screen bodies
//! - `ListingDetailView`, `ProfileDetailView`, `AlertPopup`: Overlays
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: Text input, lives in `TuiState` so its buffer survives frames
//! - `SearchPanel`, `ConversationPanel` borrow an `InputBox` for the frame
//!
//! ## Props-Based Data Flow
//!
//! Components receive external data as props, not by reaching into `App`.
//!
//! ```rust,ignore
//! // Good: Dependencies are explicit
//! TitleBar::new(app.screen, &app.user_id, &app.status_message).render(frame, area);
//!
//! // Bad: Hidden dependency on global state
//! title_bar.render(frame, area); // reads from global App
//! ```

mod alert;
mod conversation_view;
mod feed_view;
mod inbox_view;
pub mod input_box;
mod listing_card;
mod listing_detail;
mod profile_detail;
mod saved_view;
mod search_view;
mod title_bar;

pub use alert::AlertPopup;
pub use conversation_view::ConversationPanel;
pub use feed_view::FeedPanel;
pub use inbox_view::InboxPanel;
pub use input_box::{InputBox, InputEvent};
pub use listing_card::ListingCard;
pub use listing_detail::ListingDetailView;
pub use profile_detail::ProfileDetailView;
pub use saved_view::SavedPanel;
pub use search_view::SearchPanel;
pub use title_bar::TitleBar;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub(crate) fn spinner(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

/// Truncate a string to fit within `max_width` terminal cells, adding "..." if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 3 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str("...");
    out
}

/// Compute a centered rect using percentage of the outer rect.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}

/// Tags as `[Books] [Furniture]` chips.
pub(crate) fn tag_spans(tags: &[String]) -> Vec<Span<'static>> {
    let style = Style::default().fg(Color::Magenta);
    let mut spans = Vec::with_capacity(tags.len() * 2);
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(format!("[{tag}]"), style));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_ascii() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a longer title", 8), "a lon...");
        assert_eq!(truncate_str("abc", 2), "..");
    }

    #[test]
    fn test_truncate_str_counts_cells() {
        // Each CJK character takes two cells.
        assert_eq!(truncate_str("日本語のタイトル", 7), "日本...");
    }

    #[test]
    fn test_centered_rect_is_inside_outer() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 40, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 20);
        assert_eq!(inner.y, 15);
    }

    #[test]
    fn test_tag_spans_brackets_each_tag() {
        let spans = tag_spans(&["Books".to_string(), "Furniture".to_string()]);
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "[Books] [Furniture]");
    }
}
