//! # Inbox and Conversations
//!
//! The inbox lists conversations the user takes part in; the conversation
//! view shows one of them and is refreshed by polling while it is open.

use std::collections::HashSet;

use log::debug;

use crate::api::{ConversationStub, ConversationSummary, Listing, Message, PublicProfile};

/// One inbox row, resolved from the user's point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct InboxEntry {
    pub stub: ConversationStub,
    /// Filled in when the listing lookup succeeds.
    pub listing_title: Option<String>,
    /// Filled in when the profile lookup succeeds.
    pub other_name: Option<String>,
}

impl InboxEntry {
    pub fn new(summary: &ConversationSummary, user_id: &str) -> Self {
        let is_offerer = summary.offering_user_id == user_id;
        let other_user_id = if is_offerer {
            summary.receiving_user_id.clone()
        } else {
            summary.offering_user_id.clone()
        };
        Self {
            stub: ConversationStub {
                conversation_id: summary.conversation_id.clone(),
                listing_id: summary.listing_id.clone(),
                other_user_id,
                is_offerer,
            },
            listing_title: None,
            other_name: None,
        }
    }

    pub fn title(&self) -> &str {
        self.listing_title.as_deref().unwrap_or("Listing unavailable")
    }

    pub fn counterpart(&self) -> &str {
        self.other_name.as_deref().unwrap_or("Unknown user")
    }
}

/// Builds inbox rows, keeping the first of any duplicated conversation id.
pub fn inbox_entries(summaries: &[ConversationSummary], user_id: &str) -> Vec<InboxEntry> {
    let mut seen = HashSet::new();
    summaries
        .iter()
        .filter(|summary| {
            let fresh = seen.insert(summary.conversation_id.clone());
            if !fresh {
                debug!("Skipping duplicate conversation {}", summary.conversation_id);
            }
            fresh
        })
        .map(|summary| InboxEntry::new(summary, user_id))
        .collect()
}

#[derive(Debug, Default)]
pub struct InboxState {
    pub entries: Vec<InboxEntry>,
    pub selected: usize,
    pub loading: bool,
    pub loaded: bool,
}

impl InboxState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_entries(&mut self, entries: Vec<InboxEntry>) {
        self.entries = entries;
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
        self.loading = false;
        self.loaded = true;
    }

    pub fn selected(&self) -> Option<&InboxEntry> {
        self.entries.get(self.selected)
    }

    /// Removes a row ahead of the backend confirming the delete.
    pub fn remove(&mut self, conversation_id: &str) -> Option<InboxEntry> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.stub.conversation_id == conversation_id)?;
        let entry = self.entries.remove(position);
        if self.selected >= self.entries.len() {
            self.selected = self.entries.len().saturating_sub(1);
        }
        Some(entry)
    }

    pub fn select_next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1).min(self.entries.len() - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

/// An open conversation.
#[derive(Debug)]
pub struct ConversationState {
    pub stub: ConversationStub,
    pub messages: Vec<Message>,
    pub listing: Option<Listing>,
    pub other: Option<PublicProfile>,
    /// No message list has arrived yet.
    pub loading: bool,
    /// A message fetch is in flight; polls are skipped until it lands.
    pub fetching: bool,
    pub sending: bool,
}

impl ConversationState {
    pub fn new(stub: ConversationStub) -> Self {
        Self {
            stub,
            messages: Vec::new(),
            listing: None,
            other: None,
            loading: true,
            fetching: true,
            sending: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.stub.conversation_id
    }

    /// Replaces the message list. Returns false, touching nothing, when the
    /// poll brought back exactly what is already shown.
    pub fn apply_messages(&mut self, messages: Vec<Message>) -> bool {
        self.loading = false;
        self.fetching = false;
        if messages == self.messages {
            return false;
        }
        debug!(
            "Conversation {} now has {} messages",
            self.stub.conversation_id,
            messages.len()
        );
        self.messages = messages;
        true
    }

    pub fn is_mine(message: &Message, user_id: &str) -> bool {
        message.sender_id == user_id
    }
}
