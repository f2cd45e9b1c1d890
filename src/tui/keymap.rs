//! # Keymap
//!
//! Turns terminal events into core actions. Whatever has focus decides:
//! an alert swallows everything but its dismiss keys, then the top overlay,
//! then the active screen. Text input on the search and conversation
//! screens goes through the persistent `InputBox`es in `TuiState`.

use crate::api::SwipeKind;
use crate::core::action::Action;
use crate::core::detail::Overlay;
use crate::core::feed::{FeedView, Swipe};
use crate::core::state::{App, Screen};
use crate::tui::TuiState;
use crate::tui::component::EventHandler;
use crate::tui::components::InputEvent;
use crate::tui::event::TuiEvent;

pub fn translate(app: &App, tui: &mut TuiState, event: &TuiEvent) -> Option<Action> {
    if matches!(event, TuiEvent::ForceQuit) {
        return Some(Action::Quit);
    }

    if app.current_alert().is_some() {
        return match event {
            TuiEvent::Submit | TuiEvent::Escape => Some(Action::DismissAlert),
            _ => None,
        };
    }

    match app.overlays.top() {
        Some(Overlay::Listing(detail)) => {
            return match event {
                TuiEvent::Escape | TuiEvent::CursorDown | TuiEvent::InputChar('q') => {
                    Some(Action::CloseOverlay)
                }
                TuiEvent::InputChar('p') => Some(Action::OpenOffererProfile),
                // The feed's own overlay superlikes by swiping down on the card.
                TuiEvent::InputChar('c') if !detail.from_feed => Some(Action::StartChat),
                _ => None,
            };
        }
        Some(Overlay::Profile(_)) => {
            return match event {
                TuiEvent::Escape | TuiEvent::InputChar('q') => Some(Action::CloseOverlay),
                TuiEvent::CursorUp | TuiEvent::InputChar('k') => Some(Action::SelectPrevious),
                TuiEvent::CursorDown | TuiEvent::InputChar('j') => Some(Action::SelectNext),
                TuiEvent::Submit => Some(Action::OpenSelected),
                _ => None,
            };
        }
        None => {}
    }

    match app.screen {
        Screen::Feed => feed_keys(app, event),
        Screen::Search => search_keys(app, tui, event),
        Screen::Saved => saved_keys(app, event),
        Screen::Inbox => inbox_keys(app, event),
        Screen::Conversation => conversation_keys(tui, event),
    }
}

fn cycle(screen: Screen, forward: bool) -> Screen {
    match (screen, forward) {
        (Screen::Feed, true) | (Screen::Saved, false) => Screen::Search,
        (Screen::Search, true) | (Screen::Inbox, false) => Screen::Saved,
        (Screen::Saved, true) | (Screen::Feed, false) => Screen::Inbox,
        (Screen::Inbox, true) | (Screen::Search, false) => Screen::Feed,
        (Screen::Conversation, _) => Screen::Conversation,
    }
}

fn feed_keys(app: &App, event: &TuiEvent) -> Option<Action> {
    match app.feed.view() {
        FeedView::Confirming { .. } => {
            return match event {
                TuiEvent::Submit | TuiEvent::InputChar('c') => {
                    Some(Action::DismissConfirmation { open_chat: true })
                }
                TuiEvent::Escape | TuiEvent::InputChar('k') => {
                    Some(Action::DismissConfirmation { open_chat: false })
                }
                _ => None,
            };
        }
        FeedView::EndOfFeed(_) if matches!(event, TuiEvent::Submit | TuiEvent::InputChar('a')) => {
            return Some(Action::ShowAgain);
        }
        _ => {}
    }

    match event {
        TuiEvent::CursorLeft | TuiEvent::InputChar('h') => Some(Action::Swipe(Swipe::Left)),
        TuiEvent::CursorRight | TuiEvent::InputChar('l') => Some(Action::Swipe(Swipe::Right)),
        TuiEvent::CursorDown | TuiEvent::InputChar('j') => Some(Action::Swipe(Swipe::Down)),
        TuiEvent::CursorUp | TuiEvent::InputChar('k') => Some(Action::Swipe(Swipe::Up)),
        TuiEvent::InputChar('r') => Some(Action::RefreshFeed),
        TuiEvent::InputChar('q') => Some(Action::Quit),
        TuiEvent::Tab => Some(Action::SwitchScreen(cycle(app.screen, true))),
        TuiEvent::BackTab => Some(Action::SwitchScreen(cycle(app.screen, false))),
        _ => None,
    }
}

fn search_keys(app: &App, tui: &mut TuiState, event: &TuiEvent) -> Option<Action> {
    let input_empty = tui.search_input.is_empty();
    match event {
        TuiEvent::Escape => return Some(Action::SwitchScreen(Screen::Feed)),
        TuiEvent::Tab => return Some(Action::SwitchScreen(cycle(app.screen, true))),
        TuiEvent::BackTab => return Some(Action::SwitchScreen(cycle(app.screen, false))),
        TuiEvent::CursorUp => return Some(Action::SelectPrevious),
        TuiEvent::CursorDown => return Some(Action::SelectNext),
        TuiEvent::CursorLeft if input_empty => return Some(Action::RateSelected(SwipeKind::Dislike)),
        TuiEvent::CursorRight if input_empty => return Some(Action::RateSelected(SwipeKind::Like)),
        TuiEvent::Submit if input_empty => return Some(Action::OpenSelected),
        _ => {}
    }
    match tui.search_input.handle_event(event)? {
        InputEvent::Submit(query) => Some(Action::SubmitSearch(query)),
        InputEvent::ContentChanged => None,
    }
}

fn saved_keys(app: &App, event: &TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::CursorUp | TuiEvent::InputChar('k') => Some(Action::SelectPrevious),
        TuiEvent::CursorDown | TuiEvent::InputChar('j') => Some(Action::SelectNext),
        TuiEvent::Submit => Some(Action::OpenSelected),
        TuiEvent::InputChar('d') => Some(Action::RemoveSelectedSaved),
        TuiEvent::InputChar('r') => Some(Action::RefreshSaved),
        TuiEvent::InputChar('q') => Some(Action::Quit),
        TuiEvent::Escape => Some(Action::SwitchScreen(Screen::Feed)),
        TuiEvent::Tab => Some(Action::SwitchScreen(cycle(app.screen, true))),
        TuiEvent::BackTab => Some(Action::SwitchScreen(cycle(app.screen, false))),
        _ => None,
    }
}

fn inbox_keys(app: &App, event: &TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::CursorUp | TuiEvent::InputChar('k') => Some(Action::SelectPrevious),
        TuiEvent::CursorDown | TuiEvent::InputChar('j') => Some(Action::SelectNext),
        TuiEvent::Submit => Some(Action::OpenSelected),
        TuiEvent::InputChar('d') => Some(Action::DeleteSelectedConversation),
        TuiEvent::InputChar('r') => Some(Action::RefreshInbox),
        TuiEvent::InputChar('q') => Some(Action::Quit),
        TuiEvent::Escape => Some(Action::SwitchScreen(Screen::Feed)),
        TuiEvent::Tab => Some(Action::SwitchScreen(cycle(app.screen, true))),
        TuiEvent::BackTab => Some(Action::SwitchScreen(cycle(app.screen, false))),
        _ => None,
    }
}

fn conversation_keys(tui: &mut TuiState, event: &TuiEvent) -> Option<Action> {
    if matches!(event, TuiEvent::Escape) {
        tui.message_input.clear();
        return Some(Action::LeaveConversation);
    }
    match tui.message_input.handle_event(event)? {
        InputEvent::Submit(text) => Some(Action::SendMessage(text)),
        InputEvent::ContentChanged => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Effect, update};
    use crate::core::detail::{ListingDetail, ProfileDetail};
    use crate::test_support::{listing, listings, test_app};

    fn browsing_app() -> App {
        let mut app = test_app();
        let Effect::FetchFeed { generation } = update(&mut app, Action::Start) else {
            panic!("expected a feed fetch");
        };
        update(
            &mut app,
            Action::FeedLoaded {
                generation,
                result: Ok(listings(&["a", "b"])),
            },
        );
        for _ in 0..2 {
            update(&mut app, Action::ImageSettled { generation });
        }
        app
    }

    fn type_text(app: &App, tui: &mut TuiState, text: &str) {
        for c in text.chars() {
            assert_eq!(translate(app, tui, &TuiEvent::InputChar(c)), None);
        }
    }

    #[test]
    fn test_feed_arrows_and_vim_keys_swipe() {
        let app = browsing_app();
        let mut tui = TuiState::new();
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::CursorLeft),
            Some(Action::Swipe(Swipe::Left))
        );
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::InputChar('l')),
            Some(Action::Swipe(Swipe::Right))
        );
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::CursorDown),
            Some(Action::Swipe(Swipe::Down))
        );
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::InputChar('k')),
            Some(Action::Swipe(Swipe::Up))
        );
    }

    #[test]
    fn test_alert_swallows_other_keys() {
        let mut app = browsing_app();
        app.alert("load the feed", "HTTP 500");
        let mut tui = TuiState::new();
        assert_eq!(translate(&app, &mut tui, &TuiEvent::CursorLeft), None);
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::Escape),
            Some(Action::DismissAlert)
        );
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::ForceQuit),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_listing_overlay_keys() {
        let mut app = browsing_app();
        app.overlays
            .push(Overlay::Listing(ListingDetail::new(listing("a"), false)));
        let mut tui = TuiState::new();
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::InputChar('p')),
            Some(Action::OpenOffererProfile)
        );
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::Escape),
            Some(Action::CloseOverlay)
        );
        assert_eq!(translate(&app, &mut tui, &TuiEvent::CursorLeft), None);
    }

    #[test]
    fn test_chat_key_only_on_overlays_outside_the_feed() {
        let mut app = browsing_app();
        app.overlays
            .push(Overlay::Listing(ListingDetail::new(listing("a"), true)));
        let mut tui = TuiState::new();
        assert_eq!(translate(&app, &mut tui, &TuiEvent::InputChar('c')), None);

        app.overlays
            .push(Overlay::Listing(ListingDetail::new(listing("b"), false)));
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::InputChar('c')),
            Some(Action::StartChat)
        );
    }

    #[test]
    fn test_saved_and_inbox_delete_keys() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        app.screen = Screen::Saved;
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::InputChar('d')),
            Some(Action::RemoveSelectedSaved)
        );
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::Submit),
            Some(Action::OpenSelected)
        );
        app.screen = Screen::Inbox;
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::InputChar('d')),
            Some(Action::DeleteSelectedConversation)
        );
    }

    #[test]
    fn test_refresh_key_swallowed_while_confirming() {
        let mut app = browsing_app();
        update(&mut app, Action::Swipe(Swipe::Down));
        update(
            &mut app,
            Action::ConversationStarted {
                listing_id: "a".to_string(),
                result: Ok("c1".to_string()),
            },
        );
        let mut tui = TuiState::new();
        assert_eq!(translate(&app, &mut tui, &TuiEvent::InputChar('r')), None);
    }

    #[test]
    fn test_profile_overlay_keys() {
        let mut app = browsing_app();
        app.overlays
            .push(Overlay::Profile(ProfileDetail::new("p1".to_string())));
        let mut tui = TuiState::new();
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::CursorDown),
            Some(Action::SelectNext)
        );
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::Submit),
            Some(Action::OpenSelected)
        );
    }

    #[test]
    fn test_confirmation_keys() {
        let mut app = browsing_app();
        update(&mut app, Action::Swipe(Swipe::Down));
        update(
            &mut app,
            Action::ConversationStarted {
                listing_id: "a".to_string(),
                result: Ok("c1".to_string()),
            },
        );
        let mut tui = TuiState::new();
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::Submit),
            Some(Action::DismissConfirmation { open_chat: true })
        );
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::InputChar('k')),
            Some(Action::DismissConfirmation { open_chat: false })
        );
    }

    #[test]
    fn test_search_typing_then_submit() {
        let mut app = test_app();
        app.screen = Screen::Search;
        let mut tui = TuiState::new();
        type_text(&app, &mut tui, "lamp");
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::Submit),
            Some(Action::SubmitSearch("lamp".to_string()))
        );
        // Buffer cleared; Enter now opens the selection.
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::Submit),
            Some(Action::OpenSelected)
        );
    }

    #[test]
    fn test_search_left_right_rate_only_with_empty_input() {
        let mut app = test_app();
        app.screen = Screen::Search;
        let mut tui = TuiState::new();
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::CursorRight),
            Some(Action::RateSelected(SwipeKind::Like))
        );
        type_text(&app, &mut tui, "q");
        assert_eq!(translate(&app, &mut tui, &TuiEvent::CursorLeft), None);
    }

    #[test]
    fn test_tab_cycles_screens() {
        let app = test_app();
        let mut tui = TuiState::new();
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::Tab),
            Some(Action::SwitchScreen(Screen::Search))
        );
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::BackTab),
            Some(Action::SwitchScreen(Screen::Inbox))
        );
        assert_eq!(cycle(Screen::Search, true), Screen::Saved);
        assert_eq!(cycle(Screen::Saved, true), Screen::Inbox);
        assert_eq!(cycle(Screen::Inbox, true), Screen::Feed);
    }

    #[test]
    fn test_conversation_sends_and_leaves() {
        let mut app = test_app();
        app.screen = Screen::Conversation;
        let mut tui = TuiState::new();
        type_text(&app, &mut tui, "hi there");
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::Submit),
            Some(Action::SendMessage("hi there".to_string()))
        );
        assert_eq!(
            translate(&app, &mut tui, &TuiEvent::Escape),
            Some(Action::LeaveConversation)
        );
    }
}
