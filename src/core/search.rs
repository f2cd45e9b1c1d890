//! Search screen state.
//!
//! Until the user searches, the screen shows a browse page from the
//! backend. A failed search leaves the previous results on screen.

use log::debug;

use crate::api::Listing;

#[derive(Debug, Default)]
pub struct SearchState {
    /// The last query sent to the backend.
    pub query: String,
    pub results: Vec<Listing>,
    pub selected: usize,
    pub loading: bool,
    /// At least one search has completed.
    pub searched: bool,
    request: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a search. Blank queries are ignored.
    /// Returns the request number and the trimmed query.
    pub fn submit(&mut self, query: &str) -> Option<(u64, String)> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.request += 1;
        self.query = query.to_string();
        self.loading = true;
        Some((self.request, self.query.clone()))
    }

    /// Starts loading the browse page, unless the user has already searched.
    pub fn browse(&mut self) -> Option<u64> {
        if !self.query.is_empty() {
            return None;
        }
        self.request += 1;
        self.loading = true;
        Some(self.request)
    }

    /// The results on screen are the browse page rather than a search.
    pub fn is_browsing(&self) -> bool {
        self.query.is_empty()
    }

    /// Only the latest request's answer is applied.
    pub fn is_current(&self, request: u64) -> bool {
        request == self.request
    }

    pub fn apply_results(&mut self, results: Vec<Listing>) {
        debug!("Search '{}' applied {} results", self.query, results.len());
        self.results = results;
        self.selected = 0;
        self.loading = false;
        self.searched = !self.query.is_empty();
    }

    pub fn fail(&mut self) {
        self.loading = false;
    }

    pub fn selected(&self) -> Option<&Listing> {
        self.results.get(self.selected)
    }

    /// Removes the selected result, for example after it was rated.
    pub fn take_selected(&mut self) -> Option<Listing> {
        if self.selected >= self.results.len() {
            return None;
        }
        let listing = self.results.remove(self.selected);
        if self.selected >= self.results.len() {
            self.selected = self.results.len().saturating_sub(1);
        }
        Some(listing)
    }

    pub fn select_next(&mut self) {
        if !self.results.is_empty() {
            self.selected = (self.selected + 1).min(self.results.len() - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}
