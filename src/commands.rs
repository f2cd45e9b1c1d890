//! One-shot account and listing management used by the CLI subcommands.
//!
//! Everything here goes through `MarketplaceApi`, so it runs the same
//! against the real backend and the test fake.

use std::fmt::Write as _;

use futures::join;
use log::{info, warn};

use crate::api::{ApiError, ListingEdit, MarketplaceApi};
use crate::core::detail::ProfileContent;

/// The signed-in user's own profile and the listings they offer.
pub async fn own_profile(
    api: &dyn MarketplaceApi,
    user_id: &str,
) -> Result<ProfileContent, ApiError> {
    let (profile, offerings) = join!(api.profile(user_id), api.profile_offerings(user_id));
    Ok(ProfileContent {
        profile: profile?,
        offerings: offerings?,
    })
}

/// Plain-text profile summary with listing ids, for use with `edit` and
/// `delete`.
pub fn profile_report(content: &ProfileContent) -> String {
    let profile = &content.profile;
    let mut out = String::new();
    let _ = writeln!(out, "{}", profile.full_name());
    if !profile.email.is_empty() {
        let _ = writeln!(out, "{}", profile.email);
    }
    let interests = profile.interest_tags();
    if !interests.is_empty() {
        let _ = writeln!(out, "Interests: {}", interests.join(", "));
    }
    let offerings = profile.offering_tags();
    if !offerings.is_empty() {
        let _ = writeln!(out, "Offers: {}", offerings.join(", "));
    }
    let _ = writeln!(out, "Saved: {}", profile.interested.len());

    if content.offerings.is_empty() {
        out.push_str("\nNo listings yet.\n");
    } else {
        let _ = writeln!(out, "\nListings:");
        for listing in &content.offerings {
            let _ = writeln!(
                out,
                "  {}  {}  {}",
                listing.id,
                listing.title,
                listing.price_label()
            );
        }
    }
    out
}

/// Applies each edit in order and stops at the first failure.
pub async fn edit_listing(
    api: &dyn MarketplaceApi,
    listing_id: &str,
    edits: &[ListingEdit],
) -> Result<(), ApiError> {
    for edit in edits {
        api.edit_listing(listing_id, edit).await?;
    }
    info!("Applied {} edits to listing {}", edits.len(), listing_id);
    Ok(())
}

/// Removes a listing's conversations, then the listing. The listing is
/// deleted even when the conversation cleanup fails.
pub async fn delete_listing(api: &dyn MarketplaceApi, listing_id: &str) -> Result<(), ApiError> {
    if let Err(e) = api.delete_listing_conversations(listing_id).await {
        warn!("Could not clear conversations for listing {}: {}", listing_id, e);
    }
    api.delete_listing(listing_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeMarketplace, listing, profile};

    fn fake_with_profile() -> FakeMarketplace {
        let mut me = profile("Ada", "Lovelace");
        me.interested = vec!["x".to_string(), "y".to_string()];
        FakeMarketplace {
            profiles: [("u1".to_string(), me)].into_iter().collect(),
            offerings: vec![listing("l7")],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_own_profile_fetches_profile_and_listings() {
        let api = fake_with_profile();
        let content = own_profile(&api, "u1").await.unwrap();
        assert_eq!(content.profile.full_name(), "Ada Lovelace");
        assert_eq!(content.offerings.len(), 1);

        let calls = api.calls();
        assert!(calls.contains(&"public_profile u1".to_string()));
        assert!(calls.contains(&"profile_offerings u1".to_string()));
    }

    #[tokio::test]
    async fn test_own_profile_fails_when_listings_fail() {
        let api = FakeMarketplace {
            failing_calls: vec!["profile_offerings"],
            ..fake_with_profile()
        };
        assert!(own_profile(&api, "u1").await.is_err());
    }

    #[test]
    fn test_profile_report_lists_ids_and_prices() {
        let content = ProfileContent {
            profile: {
                let mut me = profile("Ada", "Lovelace");
                me.interested = vec!["x".to_string()];
                me
            },
            offerings: vec![listing("l7")],
        };
        let report = profile_report(&content);
        assert!(report.starts_with("Ada Lovelace\n"));
        assert!(report.contains("Interests: Books, Bikes"));
        assert!(report.contains("Saved: 1"));
        assert!(report.contains("  l7  Listing l7  $10"));
    }

    #[test]
    fn test_profile_report_without_listings() {
        let content = ProfileContent {
            profile: profile("Ada", "Lovelace"),
            offerings: Vec::new(),
        };
        assert!(profile_report(&content).contains("No listings yet."));
    }

    #[tokio::test]
    async fn test_edit_applies_every_field_in_order() {
        let api = FakeMarketplace::default();
        let edits = [
            ListingEdit::Title("Lamp".to_string()),
            ListingEdit::Price(8.0),
        ];
        edit_listing(&api, "l7", &edits).await.unwrap();
        assert_eq!(
            api.calls(),
            vec!["edit_listing l7 new_title", "edit_listing l7 new_price"]
        );
    }

    #[tokio::test]
    async fn test_edit_stops_at_first_failure() {
        let api = FakeMarketplace {
            failing_calls: vec!["edit_listing"],
            ..Default::default()
        };
        let edits = [
            ListingEdit::Title("Lamp".to_string()),
            ListingEdit::Description("Warm".to_string()),
        ];
        assert!(edit_listing(&api, "l7", &edits).await.is_err());
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_clears_conversations_first() {
        let api = FakeMarketplace::default();
        delete_listing(&api, "l7").await.unwrap();
        assert_eq!(
            api.calls(),
            vec!["delete_listing_conversations l7", "delete_listing l7"]
        );
    }

    #[tokio::test]
    async fn test_delete_continues_when_cleanup_fails() {
        let api = FakeMarketplace {
            failing_calls: vec!["delete_listing_conversations"],
            ..Default::default()
        };
        delete_listing(&api, "l7").await.unwrap();
        assert_eq!(api.calls().last().map(String::as_str), Some("delete_listing l7"));
    }

    #[tokio::test]
    async fn test_delete_reports_listing_failure() {
        let api = FakeMarketplace {
            failing_calls: vec!["delete_listing"],
            ..Default::default()
        };
        assert!(delete_listing(&api, "l7").await.is_err());
    }
}
