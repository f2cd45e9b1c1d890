//! # Application State
//!
//! Core business state for Handdown. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── api: Arc<dyn MarketplaceApi>  // backend
//! ├── user_id: String               // the signed-in user, passed explicitly
//! ├── screen: Screen                // which top-level view is showing
//! ├── feed: FeedSession             // swipe feed state machine
//! ├── overlays: OverlayStack        // listing/profile detail modals
//! ├── search: SearchState           // search screen
//! ├── saved: SavedState             // liked listings (parking lot)
//! ├── inbox: InboxState             // conversation list
//! ├── conversation: Option<..>      // open conversation, polled while Some
//! ├── pending_chat: Option<Listing> // conversation being started from an overlay
//! ├── alerts: VecDeque<String>      // user-facing failures, oldest first
//! └── status_message: String        // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::VecDeque;
use std::sync::Arc;

use log::warn;

use crate::api::{Listing, MarketplaceApi};
use crate::core::detail::OverlayStack;
use crate::core::feed::FeedSession;
use crate::core::inbox::{ConversationState, InboxState};
use crate::core::saved::SavedState;
use crate::core::search::SearchState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Feed,
    Search,
    Saved,
    Inbox,
    Conversation,
}

impl Screen {
    pub fn label(&self) -> &'static str {
        match self {
            Screen::Feed => "Feed",
            Screen::Search => "Search",
            Screen::Saved => "Saved",
            Screen::Inbox => "Inbox",
            Screen::Conversation => "Chat",
        }
    }
}

pub struct App {
    pub api: Arc<dyn MarketplaceApi>,
    pub user_id: String,
    pub screen: Screen,
    pub feed: FeedSession,
    pub overlays: OverlayStack,
    pub search: SearchState,
    pub saved: SavedState,
    pub inbox: InboxState,
    pub conversation: Option<ConversationState>,
    pub pending_chat: Option<Listing>,
    pub alerts: VecDeque<String>,
    pub status_message: String,
}

impl App {
    pub fn new(api: Arc<dyn MarketplaceApi>, user_id: String) -> Self {
        Self {
            api,
            user_id,
            screen: Screen::Feed,
            feed: FeedSession::new(),
            overlays: OverlayStack::new(),
            search: SearchState::new(),
            saved: SavedState::new(),
            inbox: InboxState::new(),
            conversation: None,
            pending_chat: None,
            alerts: VecDeque::new(),
            status_message: String::from("Welcome to Handdown!"),
        }
    }

    /// Records a failed operation: logged with its reason, shown to the
    /// user as one generic alert.
    pub fn alert(&mut self, operation: &str, reason: &str) {
        warn!("Failed to {}: {}", operation, reason);
        self.alerts
            .push_back(format!("Couldn't {operation}. Please try again."));
    }

    pub fn current_alert(&self) -> Option<&str> {
        self.alerts.front().map(String::as_str)
    }
}
