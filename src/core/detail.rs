//! # Detail Overlays
//!
//! Listing and profile detail views stacked on top of whatever screen is
//! showing. Each open starts from scratch and fetches again; nothing is
//! cached between opens. A result that arrives after its overlay was closed
//! finds nothing to update and is dropped.

use crate::api::{Listing, PublicProfile};

/// Data that is fetched after its view opens.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed,
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Result<T, String>> for Loadable<T> {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(_) => Loadable::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingDetail {
    pub listing: Listing,
    /// `None` when the listing names no offerer.
    pub offerer: Option<Loadable<PublicProfile>>,
    /// Opened by swiping up on the feed; closing returns the feed to browsing.
    pub from_feed: bool,
}

impl ListingDetail {
    pub fn new(listing: Listing, from_feed: bool) -> Self {
        let offerer = listing.offerer_id().map(|_| Loadable::Loading);
        Self {
            listing,
            offerer,
            from_feed,
        }
    }

    /// Opened with the offerer already known, as from a profile overlay.
    pub fn with_offerer(listing: Listing, offerer: PublicProfile) -> Self {
        Self {
            listing,
            offerer: Some(Loadable::Ready(offerer)),
            from_feed: false,
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.listing.tags
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileContent {
    pub profile: PublicProfile,
    pub offerings: Vec<Listing>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDetail {
    pub profile_id: String,
    pub content: Loadable<ProfileContent>,
    pub selected: usize,
}

impl ProfileDetail {
    pub fn new(profile_id: String) -> Self {
        Self {
            profile_id,
            content: Loadable::Loading,
            selected: 0,
        }
    }

    pub fn offerings(&self) -> &[Listing] {
        self.content
            .ready()
            .map(|content| content.offerings.as_slice())
            .unwrap_or_default()
    }

    pub fn select_next(&mut self) {
        let len = self.offerings().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    Listing(ListingDetail),
    Profile(ProfileDetail),
}

/// Overlays in open order; the last one has focus.
#[derive(Debug, Default)]
pub struct OverlayStack {
    items: Vec<Overlay>,
}

impl OverlayStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, overlay: Overlay) {
        self.items.push(overlay);
    }

    pub fn pop(&mut self) -> Option<Overlay> {
        self.items.pop()
    }

    pub fn top(&self) -> Option<&Overlay> {
        self.items.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Overlay> {
        self.items.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.items.iter()
    }

    /// Fills in the offerer of the topmost listing overlay still waiting for
    /// this profile. Returns false if no open overlay wanted it.
    pub fn apply_offerer(&mut self, profile_id: &str, result: Result<PublicProfile, String>) -> bool {
        let waiting = self.items.iter_mut().rev().find_map(|overlay| match overlay {
            Overlay::Listing(detail)
                if detail.listing.profile_offerer_id == profile_id
                    && matches!(detail.offerer, Some(Loadable::Loading)) =>
            {
                Some(detail)
            }
            _ => None,
        });
        match waiting {
            Some(detail) => {
                detail.offerer = Some(result.into());
                true
            }
            None => false,
        }
    }

    /// Fills in the topmost profile overlay still loading this profile.
    pub fn apply_profile(
        &mut self,
        profile_id: &str,
        result: Result<ProfileContent, String>,
    ) -> bool {
        let waiting = self.items.iter_mut().rev().find_map(|overlay| match overlay {
            Overlay::Profile(detail)
                if detail.profile_id == profile_id && detail.content.is_loading() =>
            {
                Some(detail)
            }
            _ => None,
        });
        match waiting {
            Some(detail) => {
                detail.content = result.into();
                detail.selected = 0;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{listing, profile};

    #[test]
    fn test_listing_detail_tags_come_from_listing() {
        let detail = ListingDetail::new(listing("a"), true);
        assert_eq!(detail.tags(), ["Books".to_string(), "Furniture".to_string()]);
        assert_eq!(detail.offerer, Some(Loadable::Loading));
    }

    #[test]
    fn test_listing_without_offerer_needs_no_fetch() {
        let mut bare = listing("a");
        bare.profile_offerer_id.clear();
        let detail = ListingDetail::new(bare, false);
        assert_eq!(detail.offerer, None);
    }

    #[test]
    fn test_offerer_result_fills_waiting_overlay() {
        let mut stack = OverlayStack::new();
        stack.push(Overlay::Listing(ListingDetail::new(listing("a"), true)));
        assert!(stack.apply_offerer("offerer-a", Ok(profile("Ada", "L"))));
        let Some(Overlay::Listing(detail)) = stack.top() else {
            panic!("expected listing overlay");
        };
        assert_eq!(
            detail.offerer.as_ref().and_then(|o| o.ready()).map(|p| p.full_name()),
            Some("Ada L".to_string())
        );
        // Already answered; a second result has nowhere to go.
        assert!(!stack.apply_offerer("offerer-a", Ok(profile("Bob", "M"))));
    }

    #[test]
    fn test_result_after_close_is_dropped() {
        let mut stack = OverlayStack::new();
        stack.push(Overlay::Listing(ListingDetail::new(listing("a"), true)));
        stack.pop();
        assert!(!stack.apply_offerer("offerer-a", Ok(profile("Ada", "L"))));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_failed_profile_marks_overlay_failed() {
        let mut stack = OverlayStack::new();
        stack.push(Overlay::Profile(ProfileDetail::new("p1".to_string())));
        assert!(stack.apply_profile("p1", Err("HTTP 404".to_string())));
        assert!(matches!(
            stack.top(),
            Some(Overlay::Profile(ProfileDetail {
                content: Loadable::Failed,
                ..
            }))
        ));
    }

    #[test]
    fn test_profile_selection_is_clamped() {
        let mut detail = ProfileDetail::new("p1".to_string());
        detail.select_next();
        assert_eq!(detail.selected, 0);
        detail.content = Loadable::Ready(ProfileContent {
            profile: profile("Ada", "L"),
            offerings: vec![listing("a"), listing("b")],
        });
        detail.select_next();
        detail.select_next();
        assert_eq!(detail.selected, 1);
        detail.select_previous();
        detail.select_previous();
        assert_eq!(detail.selected, 0);
    }
}
