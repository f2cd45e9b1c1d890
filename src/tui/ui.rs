use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::detail::Overlay;
use crate::core::state::{App, Screen};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    AlertPopup, ConversationPanel, FeedPanel, InboxPanel, ListingDetailView, ProfileDetailView,
    SavedPanel, SearchPanel, TitleBar,
};

/// Draws one frame: title bar, the active screen, overlays bottom to top,
/// then the oldest pending alert over everything.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let [title_area, main_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());

    TitleBar::new(app.screen, &app.user_id, &app.status_message).render(frame, title_area);

    let modal_open = !app.overlays.is_empty() || !app.alerts.is_empty();
    match app.screen {
        Screen::Feed => FeedPanel::new(&app.feed, spinner_frame).render(frame, main_area),
        Screen::Search => {
            tui.search_input.focused = !modal_open;
            SearchPanel::new(&app.search, &mut tui.search_input, spinner_frame)
                .render(frame, main_area);
        }
        Screen::Saved => SavedPanel::new(&app.saved, spinner_frame).render(frame, main_area),
        Screen::Inbox => InboxPanel::new(&app.inbox, spinner_frame).render(frame, main_area),
        Screen::Conversation => match &app.conversation {
            Some(conversation) => {
                tui.message_input.focused = !modal_open;
                ConversationPanel::new(
                    conversation,
                    &app.user_id,
                    &mut tui.message_input,
                    spinner_frame,
                )
                .render(frame, main_area);
            }
            None => InboxPanel::new(&app.inbox, spinner_frame).render(frame, main_area),
        },
    }

    for overlay in app.overlays.iter() {
        match overlay {
            Overlay::Listing(detail) => {
                ListingDetailView::new(detail, spinner_frame).render(frame, main_area)
            }
            Overlay::Profile(detail) => {
                ProfileDetailView::new(detail, spinner_frame).render(frame, main_area)
            }
        }
    }

    if let Some(message) = app.current_alert() {
        AlertPopup::new(message, app.alerts.len() - 1).render(frame, frame.area());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::core::detail::ListingDetail;
    use crate::test_support::{listing, test_app};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut tui = TuiState::new();
        terminal.draw(|f| draw_ui(f, app, &mut tui, 0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_draws_title_bar_and_feed() {
        let mut app = test_app();
        update(&mut app, Action::Start);
        let text = render_text(&app);
        assert!(text.contains("Feed"));
        assert!(text.contains("Welcome to Handdown!"));
    }

    #[test]
    fn test_overlay_drawn_over_screen() {
        let mut app = test_app();
        app.overlays
            .push(Overlay::Listing(ListingDetail::new(listing("a"), false)));
        assert!(render_text(&app).contains("Offered by"));
    }

    #[test]
    fn test_saved_screen_drawn() {
        let mut app = test_app();
        app.screen = Screen::Saved;
        app.saved.apply_listings(vec![listing("a")]);
        let text = render_text(&app);
        assert!(text.contains("Listing a"));
        assert!(text.contains("d remove"));
    }

    #[test]
    fn test_alert_drawn_last() {
        let mut app = test_app();
        app.overlays
            .push(Overlay::Listing(ListingDetail::new(listing("a"), false)));
        app.alert("load the profile", "HTTP 500");
        assert!(render_text(&app).contains("Couldn't load the profile."));
    }
}
