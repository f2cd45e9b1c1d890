//! Saved listings: everything the user swiped right on and hasn't
//! removed yet. Built from the `Interested` ids on the user's own profile.

use log::debug;

use crate::api::Listing;

#[derive(Debug, Default)]
pub struct SavedState {
    pub listings: Vec<Listing>,
    pub selected: usize,
    pub loading: bool,
    pub loaded: bool,
    /// Listing id whose removal is in flight.
    pub removing: Option<String>,
}

impl SavedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_listings(&mut self, listings: Vec<Listing>) {
        debug!("Saved list has {} listings", listings.len());
        self.listings = listings;
        self.selected = self.selected.min(self.listings.len().saturating_sub(1));
        self.loading = false;
        self.loaded = true;
    }

    pub fn selected(&self) -> Option<&Listing> {
        self.listings.get(self.selected)
    }

    /// Drops a listing once the backend has forgotten it. Returns whether
    /// it was still shown.
    pub fn remove(&mut self, listing_id: &str) -> bool {
        let Some(position) = self.listings.iter().position(|l| l.id == listing_id) else {
            return false;
        };
        self.listings.remove(position);
        if self.selected >= self.listings.len() {
            self.selected = self.listings.len().saturating_sub(1);
        }
        true
    }

    pub fn select_next(&mut self) {
        if !self.listings.is_empty() {
            self.selected = (self.selected + 1).min(self.listings.len() - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}
