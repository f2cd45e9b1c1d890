//! # Feed Session
//!
//! The swipeable feed as an explicit state machine.
//!
//! ```text
//!   begin_fetch ──► Loading ──(listings)──► Preloading ──(all images settled)──► Browsing(0)
//!                      │                                                           │
//!                      ├──(empty)──► EndOfFeed(Empty)           swipe ◄/► advance ─┤
//!                      └──(error)──► EndOfFeed(Failed)          swipe ▼ ──► Confirming(i) ──dismiss──► advance
//!                                                               swipe ▲ ──► Expanded(i) ──close──► Browsing(i)
//!                                                     advance past end ──► EndOfFeed(Exhausted) ──show again──► Browsing(0)
//! ```
//!
//! Invariant: whenever the view carries an index it points into `listings`;
//! otherwise the session is loading or at `EndOfFeed`. The image counter
//! never exceeds `listings.len()`.

use log::{debug, info};

use crate::api::{ConversationStub, Listing, SwipeKind};

/// A gesture on the current card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Dislike.
    Left,
    /// Like.
    Right,
    /// Superlike: start a conversation with the offerer.
    Down,
    /// Expand the card into the detail overlay.
    Up,
}

/// Why the feed has nothing to show.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEnd {
    /// The user swiped through every card.
    Exhausted,
    /// The backend returned no listings.
    Empty,
    /// The fetch failed. The sequence was cleared.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedView {
    Loading,
    Preloading,
    Browsing { index: usize },
    Expanded { index: usize },
    Confirming { index: usize, conversation: ConversationStub },
    EndOfFeed(FeedEnd),
}

/// Backend work or follow-up a feed transition asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedCommand {
    RecordSwipe { listing_id: String, kind: SwipeKind },
    StartConversation { listing_id: String },
    ShowDetail { index: usize },
}

#[derive(Debug)]
pub struct FeedSession {
    listings: Vec<Listing>,
    view: FeedView,
    images_settled: usize,
    generation: u64,
    /// Listing id of a superlike still waiting on the backend.
    pending_superlike: Option<String>,
}

impl Default for FeedSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedSession {
    pub fn new() -> Self {
        Self {
            listings: Vec::new(),
            view: FeedView::Loading,
            images_settled: 0,
            generation: 0,
            pending_superlike: None,
        }
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn view(&self) -> &FeedView {
        &self.view
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn images_settled(&self) -> usize {
        self.images_settled
    }

    pub fn superlike_pending(&self) -> bool {
        self.pending_superlike.is_some()
    }

    /// Index of the card on screen, if any.
    pub fn cursor(&self) -> Option<usize> {
        match self.view {
            FeedView::Browsing { index }
            | FeedView::Expanded { index }
            | FeedView::Confirming { index, .. } => Some(index),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&Listing> {
        self.cursor().and_then(|index| self.listings.get(index))
    }

    pub fn listing(&self, index: usize) -> Option<&Listing> {
        self.listings.get(index)
    }

    /// True once every image has settled for a non-empty sequence.
    pub fn images_ready(&self) -> bool {
        !self.listings.is_empty() && self.images_settled == self.listings.len()
    }

    /// The feed accepts swipes.
    pub fn is_interactive(&self) -> bool {
        self.images_ready() && matches!(self.view, FeedView::Browsing { .. })
    }

    /// Starts a new fetch, discarding the current sequence. Returns its generation.
    pub fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.listings.clear();
        self.images_settled = 0;
        self.pending_superlike = None;
        self.view = FeedView::Loading;
        debug!("Feed fetch started (generation {})", self.generation);
        self.generation
    }

    /// Applies a fetch result and returns the image URLs to preload.
    ///
    /// Results from an older generation are ignored. A failure clears the
    /// sequence, same as an empty page, but lands in a distinct `FeedEnd`.
    pub fn apply_fetch(&mut self, generation: u64, result: Result<Vec<Listing>, String>) -> Vec<String> {
        if generation != self.generation {
            debug!(
                "Dropping feed result for generation {} (current {})",
                generation, self.generation
            );
            return Vec::new();
        }

        match result {
            Err(reason) => {
                self.listings.clear();
                self.images_settled = 0;
                self.view = FeedView::EndOfFeed(FeedEnd::Failed(reason));
                Vec::new()
            }
            Ok(listings) if listings.is_empty() => {
                self.listings.clear();
                self.images_settled = 0;
                self.view = FeedView::EndOfFeed(FeedEnd::Empty);
                Vec::new()
            }
            Ok(listings) => {
                let urls: Vec<String> = listings
                    .iter()
                    .filter_map(|listing| listing.image_ref().map(str::to_string))
                    .collect();
                // Listings without an image have nothing to wait for.
                self.images_settled = listings.len() - urls.len();
                self.listings = listings;
                self.view = FeedView::Preloading;
                info!(
                    "Feed loaded: {} listings, {} images to preload",
                    self.listings.len(),
                    urls.len()
                );
                self.open_gate_if_ready();
                urls
            }
        }
    }

    /// Counts one finished prefetch, successful or not.
    pub fn image_settled(&mut self, generation: u64) {
        if generation != self.generation {
            return;
        }
        if self.images_settled < self.listings.len() {
            self.images_settled += 1;
        }
        debug!(
            "Images settled: {}/{}",
            self.images_settled,
            self.listings.len()
        );
        self.open_gate_if_ready();
    }

    fn open_gate_if_ready(&mut self) {
        if matches!(self.view, FeedView::Preloading) && self.images_ready() {
            self.view = FeedView::Browsing { index: 0 };
        }
    }

    /// Applies a gesture to the current card.
    ///
    /// Likes and dislikes advance right away; the returned command is
    /// fire-and-forget. A superlike holds the card until the backend answers
    /// and the user dismisses the confirmation.
    pub fn swipe(&mut self, swipe: Swipe) -> Option<FeedCommand> {
        let FeedView::Browsing { index } = self.view else {
            return None;
        };
        if self.pending_superlike.is_some() {
            debug!("Ignoring {:?} while a superlike is in flight", swipe);
            return None;
        }
        let listing_id = self.listings.get(index)?.id.clone();

        match swipe {
            Swipe::Left => {
                self.advance(index);
                Some(FeedCommand::RecordSwipe {
                    listing_id,
                    kind: SwipeKind::Dislike,
                })
            }
            Swipe::Right => {
                self.advance(index);
                Some(FeedCommand::RecordSwipe {
                    listing_id,
                    kind: SwipeKind::Like,
                })
            }
            Swipe::Down => {
                self.pending_superlike = Some(listing_id.clone());
                Some(FeedCommand::StartConversation { listing_id })
            }
            Swipe::Up => {
                self.view = FeedView::Expanded { index };
                Some(FeedCommand::ShowDetail { index })
            }
        }
    }

    fn advance(&mut self, index: usize) {
        let next = index + 1;
        self.view = if next >= self.listings.len() {
            info!("Reached end of feed after {} listings", self.listings.len());
            FeedView::EndOfFeed(FeedEnd::Exhausted)
        } else {
            FeedView::Browsing { index: next }
        };
    }

    /// The backend opened a conversation for a superlike. Returns false if
    /// the answer no longer matches the card on screen.
    pub fn conversation_started(&mut self, listing_id: &str, conversation_id: String) -> bool {
        if self.pending_superlike.as_deref() != Some(listing_id) {
            return false;
        }
        self.pending_superlike = None;

        let FeedView::Browsing { index } = self.view else {
            return false;
        };
        let Some(listing) = self.listings.get(index).filter(|l| l.id == listing_id) else {
            return false;
        };
        let conversation = ConversationStub {
            conversation_id,
            listing_id: listing.id.clone(),
            other_user_id: listing.profile_offerer_id.clone(),
            is_offerer: false,
        };
        self.view = FeedView::Confirming {
            index,
            conversation,
        };
        true
    }

    /// The superlike request failed; the card stays put.
    pub fn superlike_failed(&mut self, listing_id: &str) -> bool {
        if self.pending_superlike.as_deref() == Some(listing_id) {
            self.pending_superlike = None;
            true
        } else {
            false
        }
    }

    /// Closes the conversation confirmation and moves to the next card.
    pub fn dismiss_confirmation(&mut self) -> Option<ConversationStub> {
        let FeedView::Confirming {
            index,
            conversation,
        } = &self.view
        else {
            return None;
        };
        let (index, conversation) = (*index, conversation.clone());
        self.advance(index);
        Some(conversation)
    }

    /// Leaves the expanded view, staying on the same card.
    pub fn close_detail(&mut self) -> bool {
        if let FeedView::Expanded { index } = self.view {
            self.view = FeedView::Browsing { index };
            true
        } else {
            false
        }
    }

    /// Restarts an exhausted feed from the first card.
    pub fn show_again(&mut self) -> bool {
        if matches!(self.view, FeedView::EndOfFeed(FeedEnd::Exhausted)) && !self.listings.is_empty() {
            self.view = FeedView::Browsing { index: 0 };
            true
        } else {
            false
        }
    }
}
