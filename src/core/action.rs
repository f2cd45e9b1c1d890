//! # Actions
//!
//! Everything that can happen in Handdown becomes an `Action`.
//! User swipes right? That's `Action::Swipe(Swipe::Right)`.
//! The backend answers? That's `Action::FeedLoaded { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state and returns the `Effect` the adapter should carry out. No I/O
//! happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Backend results come back as actions carrying `Result<_, String>`; a
//! failure becomes one alert. Results addressed to state that has since
//! moved on (an older feed generation, a closed overlay, a superseded
//! search or browse page, a closed conversation) are dropped.

use log::{debug, info, warn};

use crate::api::{ConversationStub, Listing, Message, PublicProfile, SwipeKind};
use crate::core::detail::{ListingDetail, Overlay, ProfileContent, ProfileDetail};
use crate::core::feed::{FeedCommand, FeedEnd, FeedView, Swipe};
use crate::core::inbox::{ConversationState, InboxEntry};
use crate::core::state::{App, Screen};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    /// First frame: load the feed.
    Start,
    SwitchScreen(Screen),
    DismissAlert,
    RefreshFeed,
    FeedLoaded {
        generation: u64,
        result: Result<Vec<Listing>, String>,
    },
    ImageSettled {
        generation: u64,
    },
    Swipe(Swipe),
    SwipeRecorded {
        listing_id: String,
        result: Result<(), String>,
    },
    ConversationStarted {
        listing_id: String,
        result: Result<String, String>,
    },
    DismissConfirmation {
        open_chat: bool,
    },
    ShowAgain,
    /// Enter on whatever has focus: a search result, an inbox row or a
    /// listing on a profile overlay.
    OpenSelected,
    OpenOffererProfile,
    OffererLoaded {
        profile_id: String,
        result: Result<PublicProfile, String>,
    },
    ProfileLoaded {
        profile_id: String,
        result: Result<ProfileContent, String>,
    },
    CloseOverlay,
    SelectNext,
    SelectPrevious,
    SubmitSearch(String),
    SearchLoaded {
        request: u64,
        result: Result<Vec<Listing>, String>,
    },
    /// Like or dislike the selected search result.
    RateSelected(SwipeKind),
    /// Start a conversation about the listing in the top overlay.
    StartChat,
    ChatStarted {
        listing_id: String,
        result: Result<String, String>,
    },
    RefreshSaved,
    SavedLoaded(Result<Vec<Listing>, String>),
    RemoveSelectedSaved,
    InterestRemoved {
        listing_id: String,
        result: Result<(), String>,
    },
    RefreshInbox,
    /// Inbox rows, already deduplicated and enriched.
    ConversationsLoaded(Result<Vec<InboxEntry>, String>),
    DeleteSelectedConversation,
    ConversationDeleted {
        conversation_id: String,
        result: Result<(), String>,
    },
    ConversationContextLoaded {
        conversation_id: String,
        listing: Option<Listing>,
        other: Option<PublicProfile>,
    },
    MessagesLoaded {
        conversation_id: String,
        result: Result<Vec<Message>, String>,
    },
    PollTick,
    SendMessage(String),
    MessageSent {
        conversation_id: String,
        result: Result<(), String>,
    },
    LeaveConversation,
}

/// Work the adapter performs after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    FetchFeed { generation: u64 },
    PreloadImages { generation: u64, urls: Vec<String> },
    RecordSwipe { listing_id: String, kind: SwipeKind },
    StartConversation { listing_id: String },
    FetchOfferer { profile_id: String },
    FetchProfile { profile_id: String },
    Search { request: u64, query: String },
    /// The default page shown on the search screen; answered as `SearchLoaded`.
    BrowseListings { request: u64 },
    StartChat { listing_id: String },
    /// The user's `Interested` ids, resolved to listings.
    FetchSaved,
    RemoveInterest { listing_id: String },
    FetchConversations,
    DeleteConversation { conversation_id: String },
    /// Fetch messages plus the listing and other party for a newly opened conversation.
    OpenConversation(ConversationStub),
    FetchMessages { conversation_id: String },
    SendMessage { conversation_id: String, text: String },
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Quit => Effect::Quit,
        Action::Start => {
            let generation = app.feed.begin_fetch();
            Effect::FetchFeed { generation }
        }
        Action::RefreshFeed => {
            // Refetching would throw away the superlike and its confirmation.
            if app.feed.superlike_pending() || matches!(app.feed.view(), FeedView::Confirming { .. })
            {
                debug!("Ignoring feed refresh while a superlike is unresolved");
                return Effect::None;
            }
            let generation = app.feed.begin_fetch();
            Effect::FetchFeed { generation }
        }
        Action::SwitchScreen(screen) => switch_screen(app, screen),
        Action::DismissAlert => {
            app.alerts.pop_front();
            Effect::None
        }
        Action::FeedLoaded { generation, result } => {
            if generation != app.feed.generation() {
                debug!("Ignoring feed result from generation {}", generation);
                return Effect::None;
            }
            if let Err(reason) = &result {
                app.alert("load the feed", reason);
            }
            let urls = app.feed.apply_fetch(generation, result);
            if urls.is_empty() {
                Effect::None
            } else {
                Effect::PreloadImages { generation, urls }
            }
        }
        Action::ImageSettled { generation } => {
            app.feed.image_settled(generation);
            Effect::None
        }
        Action::Swipe(swipe) => {
            if app.screen != Screen::Feed || !app.overlays.is_empty() {
                return Effect::None;
            }
            match app.feed.swipe(swipe) {
                Some(FeedCommand::RecordSwipe { listing_id, kind }) => {
                    Effect::RecordSwipe { listing_id, kind }
                }
                Some(FeedCommand::StartConversation { listing_id }) => {
                    Effect::StartConversation { listing_id }
                }
                Some(FeedCommand::ShowDetail { index }) => match app.feed.listing(index).cloned() {
                    Some(listing) => open_listing(app, listing, true),
                    None => Effect::None,
                },
                None => Effect::None,
            }
        }
        Action::SwipeRecorded { listing_id, result } => {
            // The cursor already moved on; nothing to roll back.
            if let Err(reason) = result {
                warn!("Swipe on listing {} was not recorded: {}", listing_id, reason);
            }
            Effect::None
        }
        Action::ConversationStarted { listing_id, result } => {
            match result {
                Ok(conversation_id) => {
                    if app.feed.conversation_started(&listing_id, conversation_id) {
                        info!("Conversation started for listing {}", listing_id);
                    } else {
                        debug!("Dropping late conversation for listing {}", listing_id);
                    }
                }
                Err(reason) => {
                    if app.feed.superlike_failed(&listing_id) {
                        app.alert("start a conversation", &reason);
                    }
                }
            }
            Effect::None
        }
        Action::DismissConfirmation { open_chat } => match app.feed.dismiss_confirmation() {
            Some(stub) if open_chat => open_conversation(app, stub),
            _ => Effect::None,
        },
        Action::ShowAgain => {
            if app.feed.show_again() {
                return Effect::None;
            }
            match app.feed.view() {
                FeedView::EndOfFeed(FeedEnd::Empty | FeedEnd::Failed(_)) => {
                    let generation = app.feed.begin_fetch();
                    Effect::FetchFeed { generation }
                }
                _ => Effect::None,
            }
        }
        Action::OpenSelected => open_selected(app),
        Action::OpenOffererProfile => {
            let profile_id = match app.overlays.top() {
                Some(Overlay::Listing(detail)) => detail.listing.offerer_id().map(str::to_string),
                _ => None,
            };
            match profile_id {
                Some(profile_id) => {
                    app.overlays
                        .push(Overlay::Profile(ProfileDetail::new(profile_id.clone())));
                    Effect::FetchProfile { profile_id }
                }
                None => Effect::None,
            }
        }
        Action::OffererLoaded { profile_id, result } => {
            let reason = result.as_ref().err().cloned();
            if app.overlays.apply_offerer(&profile_id, result) {
                if let Some(reason) = reason {
                    app.alert("load the offerer's profile", &reason);
                }
            } else {
                debug!("Dropping offerer {} for a closed overlay", profile_id);
            }
            Effect::None
        }
        Action::ProfileLoaded { profile_id, result } => {
            let reason = result.as_ref().err().cloned();
            if app.overlays.apply_profile(&profile_id, result) {
                if let Some(reason) = reason {
                    app.alert("load the profile", &reason);
                }
            } else {
                debug!("Dropping profile {} for a closed overlay", profile_id);
            }
            Effect::None
        }
        Action::CloseOverlay => {
            if let Some(Overlay::Listing(detail)) = app.overlays.pop()
                && detail.from_feed
            {
                app.feed.close_detail();
            }
            Effect::None
        }
        Action::SelectNext => {
            select(app, true);
            Effect::None
        }
        Action::SelectPrevious => {
            select(app, false);
            Effect::None
        }
        Action::SubmitSearch(query) => match app.search.submit(&query) {
            Some((request, query)) => {
                app.status_message = format!("Searching for '{}'...", query);
                Effect::Search { request, query }
            }
            None => Effect::None,
        },
        Action::SearchLoaded { request, result } => {
            if !app.search.is_current(request) {
                debug!("Ignoring superseded search request {}", request);
                return Effect::None;
            }
            let browsing = app.search.is_browsing();
            match result {
                Ok(results) => {
                    app.status_message = if browsing {
                        format!("{} listings to browse", results.len())
                    } else {
                        format!("{} results for '{}'", results.len(), app.search.query)
                    };
                    app.search.apply_results(results);
                }
                Err(reason) => {
                    app.search.fail();
                    let operation = if browsing { "load listings" } else { "search listings" };
                    app.alert(operation, &reason);
                }
            }
            Effect::None
        }
        Action::RateSelected(kind) => {
            if app.screen != Screen::Search || !app.overlays.is_empty() {
                return Effect::None;
            }
            match app.search.take_selected() {
                Some(listing) => Effect::RecordSwipe {
                    listing_id: listing.id,
                    kind,
                },
                None => Effect::None,
            }
        }
        Action::StartChat => start_chat(app),
        Action::ChatStarted { listing_id, result } => chat_started(app, &listing_id, result),
        Action::RefreshSaved => {
            if app.screen != Screen::Saved {
                return Effect::None;
            }
            app.saved.loading = true;
            Effect::FetchSaved
        }
        Action::SavedLoaded(result) => {
            match result {
                Ok(listings) => app.saved.apply_listings(listings),
                Err(reason) => {
                    app.saved.loading = false;
                    app.alert("load your saved listings", &reason);
                }
            }
            Effect::None
        }
        Action::RemoveSelectedSaved => {
            if app.screen != Screen::Saved
                || !app.overlays.is_empty()
                || app.saved.removing.is_some()
            {
                return Effect::None;
            }
            match app.saved.selected() {
                Some(listing) => {
                    let listing_id = listing.id.clone();
                    app.saved.removing = Some(listing_id.clone());
                    Effect::RemoveInterest { listing_id }
                }
                None => Effect::None,
            }
        }
        Action::InterestRemoved { listing_id, result } => {
            app.saved.removing = None;
            match result {
                Ok(()) => {
                    if app.saved.remove(&listing_id) {
                        app.status_message = "Removed from saved".to_string();
                    }
                }
                Err(reason) => app.alert("remove the saved listing", &reason),
            }
            Effect::None
        }
        Action::RefreshInbox => {
            app.inbox.loading = true;
            Effect::FetchConversations
        }
        Action::ConversationsLoaded(result) => {
            match result {
                Ok(entries) => app.inbox.apply_entries(entries),
                Err(reason) => {
                    app.inbox.loading = false;
                    app.alert("load your conversations", &reason);
                }
            }
            Effect::None
        }
        Action::DeleteSelectedConversation => {
            if app.screen != Screen::Inbox || !app.overlays.is_empty() {
                return Effect::None;
            }
            let Some(conversation_id) = app
                .inbox
                .selected()
                .map(|entry| entry.stub.conversation_id.clone())
            else {
                return Effect::None;
            };
            app.inbox.remove(&conversation_id);
            Effect::DeleteConversation { conversation_id }
        }
        Action::ConversationDeleted {
            conversation_id,
            result,
        } => {
            match result {
                Ok(()) => {
                    info!("Conversation {} deleted", conversation_id);
                    app.status_message = "Conversation deleted".to_string();
                }
                Err(reason) => app.alert("delete the conversation", &reason),
            }
            // Either way the list is refetched; a failed delete brings the row back.
            app.inbox.loading = true;
            Effect::FetchConversations
        }
        Action::ConversationContextLoaded {
            conversation_id,
            listing,
            other,
        } => {
            if let Some(conversation) = open_conversation_mut(app, &conversation_id) {
                conversation.listing = listing;
                conversation.other = other;
            }
            Effect::None
        }
        Action::MessagesLoaded {
            conversation_id,
            result,
        } => {
            let Some(conversation) = open_conversation_mut(app, &conversation_id) else {
                debug!("Dropping messages for closed conversation {}", conversation_id);
                return Effect::None;
            };
            match result {
                Ok(messages) => {
                    conversation.apply_messages(messages);
                }
                Err(reason) => {
                    let first_load = conversation.loading;
                    conversation.loading = false;
                    conversation.fetching = false;
                    if first_load {
                        app.alert("load messages", &reason);
                    } else {
                        // The next tick retries.
                        warn!("Message poll for {} failed: {}", conversation_id, reason);
                    }
                }
            }
            Effect::None
        }
        Action::PollTick => {
            if app.screen != Screen::Conversation {
                return Effect::None;
            }
            match app.conversation.as_mut() {
                Some(conversation) if !conversation.fetching => {
                    conversation.fetching = true;
                    Effect::FetchMessages {
                        conversation_id: conversation.id().to_string(),
                    }
                }
                _ => Effect::None,
            }
        }
        Action::SendMessage(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Effect::None;
            }
            match app.conversation.as_mut() {
                Some(conversation) if !conversation.sending => {
                    conversation.sending = true;
                    Effect::SendMessage {
                        conversation_id: conversation.id().to_string(),
                        text: text.to_string(),
                    }
                }
                _ => Effect::None,
            }
        }
        Action::MessageSent {
            conversation_id,
            result,
        } => {
            let Some(conversation) = open_conversation_mut(app, &conversation_id) else {
                return Effect::None;
            };
            conversation.sending = false;
            match result {
                // A fetch already in flight clears the flag when it lands;
                // the next tick picks up the new message.
                Ok(()) if conversation.fetching => Effect::None,
                Ok(()) => {
                    conversation.fetching = true;
                    Effect::FetchMessages { conversation_id }
                }
                Err(reason) => {
                    app.alert("send your message", &reason);
                    Effect::None
                }
            }
        }
        Action::LeaveConversation => {
            if app.conversation.take().is_none() {
                return Effect::None;
            }
            app.overlays = Default::default();
            app.screen = Screen::Inbox;
            app.inbox.loading = true;
            Effect::FetchConversations
        }
    }
}

fn switch_screen(app: &mut App, screen: Screen) -> Effect {
    // Overlays and the conversation view own the keyboard until closed.
    if !app.overlays.is_empty() || app.screen == Screen::Conversation || screen == app.screen {
        return Effect::None;
    }
    if screen == Screen::Conversation {
        return Effect::None;
    }
    debug!("Switching screen {:?} -> {:?}", app.screen, screen);
    app.screen = screen;
    match screen {
        Screen::Inbox => {
            app.inbox.loading = true;
            Effect::FetchConversations
        }
        Screen::Saved => {
            app.saved.loading = true;
            Effect::FetchSaved
        }
        Screen::Search => match app.search.browse() {
            Some(request) => Effect::BrowseListings { request },
            None => Effect::None,
        },
        Screen::Feed | Screen::Conversation => Effect::None,
    }
}

/// Pops every overlay, returning the feed to its card if one of them was
/// the feed's own detail view.
fn close_overlays(app: &mut App) {
    while let Some(overlay) = app.overlays.pop() {
        if let Overlay::Listing(detail) = overlay
            && detail.from_feed
        {
            app.feed.close_detail();
        }
    }
}

/// Superlike from a listing overlay opened outside the feed. The feed's
/// own overlay closes with swipe-down instead.
fn start_chat(app: &mut App) -> Effect {
    if app.pending_chat.is_some() {
        return Effect::None;
    }
    let listing = match app.overlays.top() {
        Some(Overlay::Listing(detail)) if !detail.from_feed => detail.listing.clone(),
        _ => return Effect::None,
    };
    if listing.offerer_id() == Some(app.user_id.as_str()) {
        app.status_message = "That's your own listing".to_string();
        return Effect::None;
    }
    info!("Starting conversation about listing {}", listing.id);
    app.status_message = "Starting a conversation...".to_string();
    let listing_id = listing.id.clone();
    app.pending_chat = Some(listing);
    Effect::StartChat { listing_id }
}

fn chat_started(app: &mut App, listing_id: &str, result: Result<String, String>) -> Effect {
    let Some(listing) = app.pending_chat.take_if(|listing| listing.id == listing_id) else {
        debug!("Dropping unexpected conversation start for {}", listing_id);
        return Effect::None;
    };
    let conversation_id = match result {
        Ok(conversation_id) => conversation_id,
        Err(reason) => {
            app.status_message.clear();
            app.alert("start a conversation", &reason);
            return Effect::None;
        }
    };
    let stub = ConversationStub {
        conversation_id,
        listing_id: listing.id.clone(),
        other_user_id: listing.profile_offerer_id.clone(),
        is_offerer: false,
    };
    // Jump straight in only if the user is still looking at that listing.
    let still_open = matches!(
        app.overlays.top(),
        Some(Overlay::Listing(detail)) if detail.listing.id == listing.id
    );
    if still_open && app.screen != Screen::Conversation {
        close_overlays(app);
        app.status_message = format!("Chatting about {}", listing.title);
        return open_conversation(app, stub);
    }
    app.status_message = "Conversation started. Find it in your inbox.".to_string();
    Effect::None
}

fn open_listing(app: &mut App, listing: Listing, from_feed: bool) -> Effect {
    let detail = ListingDetail::new(listing, from_feed);
    let effect = match detail.listing.offerer_id() {
        Some(profile_id) => Effect::FetchOfferer {
            profile_id: profile_id.to_string(),
        },
        None => Effect::None,
    };
    app.overlays.push(Overlay::Listing(detail));
    effect
}

fn open_conversation(app: &mut App, stub: ConversationStub) -> Effect {
    info!("Opening conversation {}", stub.conversation_id);
    app.conversation = Some(ConversationState::new(stub.clone()));
    app.screen = Screen::Conversation;
    Effect::OpenConversation(stub)
}

fn open_conversation_mut<'a>(
    app: &'a mut App,
    conversation_id: &str,
) -> Option<&'a mut ConversationState> {
    app.conversation
        .as_mut()
        .filter(|conversation| conversation.id() == conversation_id)
}

fn open_selected(app: &mut App) -> Effect {
    match app.overlays.top() {
        Some(Overlay::Profile(detail)) => {
            let Some(content) = detail.content.ready() else {
                return Effect::None;
            };
            let Some(listing) = content.offerings.get(detail.selected) else {
                return Effect::None;
            };
            let overlay = ListingDetail::with_offerer(listing.clone(), content.profile.clone());
            app.overlays.push(Overlay::Listing(overlay));
            return Effect::None;
        }
        Some(Overlay::Listing(_)) => return Effect::None,
        None => {}
    }

    match app.screen {
        Screen::Search => match app.search.selected().cloned() {
            Some(listing) => open_listing(app, listing, false),
            None => Effect::None,
        },
        Screen::Saved => match app.saved.selected().cloned() {
            Some(listing) => open_listing(app, listing, false),
            None => Effect::None,
        },
        Screen::Inbox => match app.inbox.selected() {
            Some(entry) => {
                let stub = entry.stub.clone();
                open_conversation(app, stub)
            }
            None => Effect::None,
        },
        Screen::Feed | Screen::Conversation => Effect::None,
    }
}

fn select(app: &mut App, forward: bool) {
    if let Some(Overlay::Profile(detail)) = app.overlays.top_mut() {
        if forward {
            detail.select_next();
        } else {
            detail.select_previous();
        }
        return;
    }
    if !app.overlays.is_empty() {
        return;
    }
    match app.screen {
        Screen::Search if forward => app.search.select_next(),
        Screen::Search => app.search.select_previous(),
        Screen::Saved if forward => app.saved.select_next(),
        Screen::Saved => app.saved.select_previous(),
        Screen::Inbox if forward => app.inbox.select_next(),
        Screen::Inbox => app.inbox.select_previous(),
        Screen::Feed | Screen::Conversation => {}
    }
}
