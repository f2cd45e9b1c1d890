//! # Effect Runner
//!
//! Carries out the `Effect` returned by `update()`. Each backend call runs
//! on its own tokio task and reports back as an `Action` over the event
//! loop's channel; nothing here touches `App` after the spawn.

use std::sync::{Arc, mpsc};

use futures::future::{join, join_all};
use log::{debug, info, warn};

use crate::api::{ConversationStub, Listing, MarketplaceApi};
use crate::core::action::{Action, Effect};
use crate::core::detail::ProfileContent;
use crate::core::inbox::{InboxEntry, inbox_entries};
use crate::core::state::App;

/// Sends an action back to the event loop. A dropped receiver means the
/// loop has exited, so the result is simply discarded.
fn send(tx: &mpsc::Sender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Failed to deliver background result: receiver dropped");
    }
}

pub fn spawn_effect(app: &App, effect: Effect, tx: &mpsc::Sender<Action>) {
    let api = app.api.clone();
    let user_id = app.user_id.clone();
    let tx = tx.clone();

    match effect {
        Effect::None | Effect::Quit => {}
        Effect::FetchFeed { generation } => {
            info!("Fetching feed (generation {})", generation);
            tokio::spawn(async move {
                let result = api
                    .feed_listings(&user_id)
                    .await
                    .map_err(|e| e.to_string());
                send(&tx, Action::FeedLoaded { generation, result });
            });
        }
        Effect::PreloadImages { generation, urls } => {
            debug!("Preloading {} images (generation {})", urls.len(), generation);
            for url in urls {
                let api = api.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    // A failed download still settles; the card shows without it.
                    if let Err(e) = api.prefetch_image(&url).await {
                        debug!("Image {} failed to preload: {}", url, e);
                    }
                    send(&tx, Action::ImageSettled { generation });
                });
            }
        }
        Effect::RecordSwipe { listing_id, kind } => {
            tokio::spawn(async move {
                let result = api
                    .record_swipe(&listing_id, &user_id, kind)
                    .await
                    .map_err(|e| e.to_string());
                send(&tx, Action::SwipeRecorded { listing_id, result });
            });
        }
        Effect::StartConversation { listing_id } => {
            info!("Superlike on listing {}", listing_id);
            tokio::spawn(async move {
                let result = api
                    .start_conversation(&listing_id, &user_id)
                    .await
                    .map(|response| response.conversation_id)
                    .map_err(|e| e.to_string());
                send(&tx, Action::ConversationStarted { listing_id, result });
            });
        }
        Effect::FetchOfferer { profile_id } => {
            tokio::spawn(async move {
                let result = api
                    .public_profile(&profile_id)
                    .await
                    .map_err(|e| e.to_string());
                send(&tx, Action::OffererLoaded { profile_id, result });
            });
        }
        Effect::FetchProfile { profile_id } => {
            tokio::spawn(async move {
                let result = load_profile(api.as_ref(), &profile_id).await;
                send(&tx, Action::ProfileLoaded { profile_id, result });
            });
        }
        Effect::Search { request, query } => {
            tokio::spawn(async move {
                let result = api
                    .search_listings(&query, &user_id)
                    .await
                    .map_err(|e| e.to_string());
                send(&tx, Action::SearchLoaded { request, result });
            });
        }
        Effect::BrowseListings { request } => {
            tokio::spawn(async move {
                let result = api
                    .browse_listings(&user_id)
                    .await
                    .map_err(|e| e.to_string());
                send(&tx, Action::SearchLoaded { request, result });
            });
        }
        Effect::StartChat { listing_id } => {
            info!("Starting conversation about listing {}", listing_id);
            tokio::spawn(async move {
                let result = api
                    .start_conversation(&listing_id, &user_id)
                    .await
                    .map(|response| response.conversation_id)
                    .map_err(|e| e.to_string());
                send(&tx, Action::ChatStarted { listing_id, result });
            });
        }
        Effect::FetchSaved => {
            tokio::spawn(async move {
                let result = load_saved(api, &user_id).await;
                send(&tx, Action::SavedLoaded(result));
            });
        }
        Effect::RemoveInterest { listing_id } => {
            tokio::spawn(async move {
                let result = api
                    .remove_interested(&listing_id, &user_id)
                    .await
                    .map_err(|e| e.to_string());
                send(&tx, Action::InterestRemoved { listing_id, result });
            });
        }
        Effect::DeleteConversation { conversation_id } => {
            tokio::spawn(async move {
                let result = api
                    .delete_conversation(&conversation_id)
                    .await
                    .map_err(|e| e.to_string());
                send(
                    &tx,
                    Action::ConversationDeleted {
                        conversation_id,
                        result,
                    },
                );
            });
        }
        Effect::FetchConversations => {
            tokio::spawn(async move {
                let result = load_inbox(api, &user_id).await;
                send(&tx, Action::ConversationsLoaded(result));
            });
        }
        Effect::OpenConversation(stub) => {
            spawn_fetch_messages(api.clone(), stub.conversation_id.clone(), tx.clone());
            tokio::spawn(async move {
                let action = load_conversation_context(api.as_ref(), stub).await;
                send(&tx, action);
            });
        }
        Effect::FetchMessages { conversation_id } => {
            spawn_fetch_messages(api, conversation_id, tx);
        }
        Effect::SendMessage {
            conversation_id,
            text,
        } => {
            tokio::spawn(async move {
                let result = api
                    .send_message(&conversation_id, &user_id, &text)
                    .await
                    .map_err(|e| e.to_string());
                send(
                    &tx,
                    Action::MessageSent {
                        conversation_id,
                        result,
                    },
                );
            });
        }
    }
}

fn spawn_fetch_messages(
    api: Arc<dyn MarketplaceApi>,
    conversation_id: String,
    tx: mpsc::Sender<Action>,
) {
    tokio::spawn(async move {
        let result = api
            .messages(&conversation_id)
            .await
            .map_err(|e| e.to_string());
        send(
            &tx,
            Action::MessagesLoaded {
                conversation_id,
                result,
            },
        );
    });
}

async fn load_profile(
    api: &dyn MarketplaceApi,
    profile_id: &str,
) -> Result<ProfileContent, String> {
    let profile = api
        .public_profile(profile_id)
        .await
        .map_err(|e| e.to_string())?;
    let offerings = api
        .profile_offerings(profile_id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(ProfileContent { profile, offerings })
}

/// The listings behind the user's `Interested` ids, fetched concurrently.
/// Listings that can no longer be fetched are left out.
async fn load_saved(api: Arc<dyn MarketplaceApi>, user_id: &str) -> Result<Vec<Listing>, String> {
    let profile = api.profile(user_id).await.map_err(|e| e.to_string())?;
    debug!("Resolving {} saved listings", profile.interested.len());

    let lookups = profile.interested.iter().map(|listing_id| {
        let api = api.clone();
        async move {
            match api.listing(listing_id).await {
                Ok(listing) => Some(listing),
                Err(e) => {
                    debug!("Saved listing {} unavailable: {}", listing_id, e);
                    None
                }
            }
        }
    });
    Ok(join_all(lookups).await.into_iter().flatten().collect())
}

/// Conversation rows plus, per row, the listing title and the other
/// party's name. A failed lookup leaves that field empty; only the list
/// itself failing is an error.
async fn load_inbox(
    api: Arc<dyn MarketplaceApi>,
    user_id: &str,
) -> Result<Vec<InboxEntry>, String> {
    let summaries = api.conversations(user_id).await.map_err(|e| e.to_string())?;
    let entries = inbox_entries(&summaries, user_id);
    debug!("Enriching {} inbox entries", entries.len());

    let enriched = entries.into_iter().map(|mut entry| {
        let api = api.clone();
        async move {
            let (listing, profile) = join(
                api.listing(&entry.stub.listing_id),
                api.profile(&entry.stub.other_user_id),
            )
            .await;
            entry.listing_title = listing
                .ok()
                .map(|listing| listing.title)
                .filter(|title| !title.is_empty());
            entry.other_name = profile
                .ok()
                .map(|profile| profile.full_name())
                .filter(|name| !name.is_empty());
            entry
        }
    });
    Ok(join_all(enriched).await)
}

async fn load_conversation_context(api: &dyn MarketplaceApi, stub: ConversationStub) -> Action {
    let (listing, other) = join(
        api.listing(&stub.listing_id),
        api.public_profile(&stub.other_user_id),
    )
    .await;
    if let Err(e) = &listing {
        debug!("Listing {} unavailable: {}", stub.listing_id, e);
    }
    Action::ConversationContextLoaded {
        conversation_id: stub.conversation_id,
        listing: listing.ok(),
        other: other.ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ConversationSummary, SwipeKind};
    use crate::test_support::{FakeMarketplace, app_with, listings, profile};
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(2);

    fn collect(rx: &mpsc::Receiver<Action>, count: usize) -> Vec<Action> {
        (0..count)
            .map(|_| rx.recv_timeout(TIMEOUT).expect("action within timeout"))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_fetch_feed_reports_generation() {
        let app = app_with(FakeMarketplace {
            feed: listings(&["a", "b"]),
            ..FakeMarketplace::default()
        });
        let (tx, rx) = mpsc::channel();
        spawn_effect(&app, Effect::FetchFeed { generation: 3 }, &tx);

        let actions = collect(&rx, 1);
        assert_eq!(
            actions[0],
            Action::FeedLoaded {
                generation: 3,
                result: Ok(listings(&["a", "b"])),
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_every_image_settles_even_when_broken() {
        let app = app_with(FakeMarketplace {
            broken_images: vec!["https://cdn.test/b.png".to_string()],
            ..FakeMarketplace::default()
        });
        let (tx, rx) = mpsc::channel();
        let urls = vec![
            "https://cdn.test/a.png".to_string(),
            "https://cdn.test/b.png".to_string(),
        ];
        spawn_effect(&app, Effect::PreloadImages { generation: 1, urls }, &tx);

        let actions = collect(&rx, 2);
        assert!(
            actions
                .iter()
                .all(|a| *a == Action::ImageSettled { generation: 1 })
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failure_becomes_error_string() {
        let app = app_with(FakeMarketplace {
            failing: true,
            ..FakeMarketplace::default()
        });
        let (tx, rx) = mpsc::channel();
        spawn_effect(
            &app,
            Effect::RecordSwipe {
                listing_id: "a".to_string(),
                kind: SwipeKind::Like,
            },
            &tx,
        );

        match collect(&rx, 1).remove(0) {
            Action::SwipeRecorded { listing_id, result } => {
                assert_eq!(listing_id, "a");
                assert!(result.unwrap_err().contains("500"));
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_superlike_returns_conversation_id() {
        let app = app_with(FakeMarketplace::default());
        let (tx, rx) = mpsc::channel();
        spawn_effect(
            &app,
            Effect::StartConversation {
                listing_id: "a".to_string(),
            },
            &tx,
        );
        assert_eq!(
            collect(&rx, 1)[0],
            Action::ConversationStarted {
                listing_id: "a".to_string(),
                result: Ok("conv-a".to_string()),
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_inbox_is_deduplicated_and_enriched() {
        let summary = ConversationSummary {
            conversation_id: "c1".to_string(),
            listing_id: "l1".to_string(),
            offering_user_id: "u2".to_string(),
            receiving_user_id: "u1".to_string(),
        };
        let mut profiles = std::collections::HashMap::new();
        profiles.insert("u2".to_string(), profile("Grace", "Hopper"));
        let app = app_with(FakeMarketplace {
            conversations: vec![summary.clone(), summary],
            profiles,
            ..FakeMarketplace::default()
        });
        let (tx, rx) = mpsc::channel();
        spawn_effect(&app, Effect::FetchConversations, &tx);

        let Action::ConversationsLoaded(Ok(entries)) = collect(&rx, 1).remove(0) else {
            panic!("expected loaded conversations");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].listing_title.as_deref(), Some("Listing l1"));
        assert_eq!(entries[0].other_name.as_deref(), Some("Grace Hopper"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_inbox_enrichment_failure_leaves_fallbacks() {
        let summary = ConversationSummary {
            conversation_id: "c1".to_string(),
            listing_id: "l1".to_string(),
            offering_user_id: "u1".to_string(),
            receiving_user_id: "u9".to_string(),
        };
        let app = app_with(FakeMarketplace {
            conversations: vec![summary],
            ..FakeMarketplace::default()
        });
        let (tx, rx) = mpsc::channel();
        spawn_effect(&app, Effect::FetchConversations, &tx);

        let Action::ConversationsLoaded(Ok(entries)) = collect(&rx, 1).remove(0) else {
            panic!("expected loaded conversations");
        };
        assert_eq!(entries[0].other_name, None);
        assert_eq!(entries[0].counterpart(), "Unknown user");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_saved_resolves_interested_ids_in_order() {
        let mut own = profile("Ada", "Lovelace");
        own.interested = vec!["l1".to_string(), "gone".to_string(), "l2".to_string()];
        let mut profiles = std::collections::HashMap::new();
        profiles.insert("u1".to_string(), own);
        let app = app_with(FakeMarketplace {
            profiles,
            missing_listings: vec!["gone".to_string()],
            ..FakeMarketplace::default()
        });
        let (tx, rx) = mpsc::channel();
        spawn_effect(&app, Effect::FetchSaved, &tx);

        let Action::SavedLoaded(Ok(saved)) = collect(&rx, 1).remove(0) else {
            panic!("expected saved listings");
        };
        let ids: Vec<&str> = saved.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["l1", "l2"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_saved_fails_without_own_profile() {
        let app = app_with(FakeMarketplace::default());
        let (tx, rx) = mpsc::channel();
        spawn_effect(&app, Effect::FetchSaved, &tx);
        assert!(matches!(
            collect(&rx, 1).remove(0),
            Action::SavedLoaded(Err(reason)) if reason.contains("404")
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_browse_answers_as_search_result() {
        let app = app_with(FakeMarketplace {
            browse_results: listings(&["a"]),
            ..FakeMarketplace::default()
        });
        let (tx, rx) = mpsc::channel();
        spawn_effect(&app, Effect::BrowseListings { request: 4 }, &tx);
        assert_eq!(
            collect(&rx, 1)[0],
            Action::SearchLoaded {
                request: 4,
                result: Ok(listings(&["a"])),
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_chat_and_removal_report_back() {
        let app = app_with(FakeMarketplace {
            failing_calls: vec!["remove_interested"],
            ..FakeMarketplace::default()
        });
        let (tx, rx) = mpsc::channel();
        spawn_effect(
            &app,
            Effect::StartChat {
                listing_id: "a".to_string(),
            },
            &tx,
        );
        assert_eq!(
            collect(&rx, 1)[0],
            Action::ChatStarted {
                listing_id: "a".to_string(),
                result: Ok("conv-a".to_string()),
            }
        );

        spawn_effect(
            &app,
            Effect::RemoveInterest {
                listing_id: "a".to_string(),
            },
            &tx,
        );
        assert!(matches!(
            collect(&rx, 1).remove(0),
            Action::InterestRemoved { listing_id, result: Err(_) } if listing_id == "a"
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_delete_conversation_reports_back() {
        let app = app_with(FakeMarketplace::default());
        let (tx, rx) = mpsc::channel();
        spawn_effect(
            &app,
            Effect::DeleteConversation {
                conversation_id: "c1".to_string(),
            },
            &tx,
        );
        assert_eq!(
            collect(&rx, 1)[0],
            Action::ConversationDeleted {
                conversation_id: "c1".to_string(),
                result: Ok(()),
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_profile_loads_offerings() {
        let mut profiles = std::collections::HashMap::new();
        profiles.insert("p1".to_string(), profile("Ada", "Lovelace"));
        let app = app_with(FakeMarketplace {
            profiles,
            offerings: listings(&["x"]),
            ..FakeMarketplace::default()
        });
        let (tx, rx) = mpsc::channel();
        spawn_effect(
            &app,
            Effect::FetchProfile {
                profile_id: "p1".to_string(),
            },
            &tx,
        );

        let Action::ProfileLoaded { profile_id, result } = collect(&rx, 1).remove(0) else {
            panic!("expected a profile");
        };
        assert_eq!(profile_id, "p1");
        let content = result.unwrap();
        assert_eq!(content.profile.full_name(), "Ada Lovelace");
        assert_eq!(content.offerings.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_open_conversation_fetches_messages_and_context() {
        let app = app_with(FakeMarketplace::default());
        let (tx, rx) = mpsc::channel();
        let stub = ConversationStub {
            conversation_id: "c1".to_string(),
            listing_id: "l1".to_string(),
            other_user_id: "u2".to_string(),
            is_offerer: false,
        };
        spawn_effect(&app, Effect::OpenConversation(stub), &tx);

        let actions = collect(&rx, 2);
        assert!(actions.iter().any(|a| matches!(
            a,
            Action::MessagesLoaded { conversation_id, result: Ok(_) } if conversation_id == "c1"
        )));
        assert!(actions.iter().any(|a| matches!(
            a,
            Action::ConversationContextLoaded { listing: Some(_), other: None, .. }
        )));
    }
}
