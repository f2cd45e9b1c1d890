//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::types::SuperlikeResponse;
use crate::api::{
    ApiError, BasicInfo, ConversationSummary, ImageUpload, Listing, ListingEdit, ListingType,
    MarketplaceApi, Message, NewListing, PublicProfile, SwipeKind, TransactionType,
};

/// Canned backend for tests that don't need a server.
///
/// The default answers every call successfully with empty data. Set
/// `failing` to make every call return HTTP 500, or list operation names in
/// `failing_calls` to fail only those. Every call is logged to `calls` as
/// `"name arg"`.
#[derive(Default)]
pub struct FakeMarketplace {
    pub feed: Vec<Listing>,
    pub search_results: Vec<Listing>,
    pub browse_results: Vec<Listing>,
    pub conversations: Vec<ConversationSummary>,
    pub profiles: HashMap<String, PublicProfile>,
    pub offerings: Vec<Listing>,
    pub messages: Vec<Message>,
    pub failing: bool,
    pub failing_calls: Vec<&'static str>,
    /// Listing ids whose lookup fails.
    pub missing_listings: Vec<String>,
    /// Image URLs that fail to download.
    pub broken_images: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeMarketplace {
    fn check(&self, operation: &'static str, arg: &str) -> Result<(), ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{operation} {arg}"));
        }
        if self.failing || self.failing_calls.contains(&operation) {
            return Err(ApiError::Api {
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MarketplaceApi for FakeMarketplace {
    async fn feed_listings(&self, user_id: &str) -> Result<Vec<Listing>, ApiError> {
        self.check("feed_listings", user_id)?;
        Ok(self.feed.clone())
    }

    async fn record_swipe(
        &self,
        listing_id: &str,
        _user_id: &str,
        _kind: SwipeKind,
    ) -> Result<(), ApiError> {
        self.check("record_swipe", listing_id)
    }

    async fn start_conversation(
        &self,
        listing_id: &str,
        _user_id: &str,
    ) -> Result<SuperlikeResponse, ApiError> {
        self.check("start_conversation", listing_id)?;
        Ok(SuperlikeResponse {
            conversation_id: format!("conv-{listing_id}"),
        })
    }

    async fn prefetch_image(&self, url: &str) -> Result<(), ApiError> {
        self.check("prefetch_image", url)?;
        if self.broken_images.iter().any(|broken| broken == url) {
            return Err(ApiError::Api {
                status: 404,
                message: "not found".to_string(),
            });
        }
        Ok(())
    }

    async fn public_profile(&self, profile_id: &str) -> Result<PublicProfile, ApiError> {
        self.check("public_profile", profile_id)?;
        self.profiles
            .get(profile_id)
            .cloned()
            .ok_or_else(|| ApiError::Api {
                status: 404,
                message: format!("no profile {profile_id}"),
            })
    }

    async fn profile(&self, profile_id: &str) -> Result<PublicProfile, ApiError> {
        self.public_profile(profile_id).await
    }

    async fn profile_offerings(&self, profile_id: &str) -> Result<Vec<Listing>, ApiError> {
        self.check("profile_offerings", profile_id)?;
        Ok(self.offerings.clone())
    }

    async fn listing(&self, listing_id: &str) -> Result<Listing, ApiError> {
        self.check("listing", listing_id)?;
        if self.missing_listings.iter().any(|id| id == listing_id) {
            return Err(ApiError::Api {
                status: 404,
                message: format!("no listing {listing_id}"),
            });
        }
        Ok(listing(listing_id))
    }

    async fn search_listings(&self, query: &str, _user_id: &str) -> Result<Vec<Listing>, ApiError> {
        self.check("search_listings", query)?;
        Ok(self.search_results.clone())
    }

    async fn browse_listings(&self, user_id: &str) -> Result<Vec<Listing>, ApiError> {
        self.check("browse_listings", user_id)?;
        Ok(self.browse_results.clone())
    }

    async fn remove_interested(&self, listing_id: &str, _user_id: &str) -> Result<(), ApiError> {
        self.check("remove_interested", listing_id)
    }

    async fn conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>, ApiError> {
        self.check("conversations", user_id)?;
        Ok(self.conversations.clone())
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), ApiError> {
        self.check("delete_conversation", conversation_id)
    }

    async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError> {
        self.check("messages", conversation_id)?;
        Ok(self.messages.clone())
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        _user_id: &str,
        _text: &str,
    ) -> Result<(), ApiError> {
        self.check("send_message", conversation_id)
    }

    async fn login(&self, email: &str, _password: &str) -> Result<String, ApiError> {
        self.check("login", email)?;
        Ok("u-fake".to_string())
    }

    async fn request_signup(&self, email: &str, _password: &str) -> Result<(), ApiError> {
        self.check("request_signup", email)
    }

    async fn verify_email(&self, code: &str) -> Result<String, ApiError> {
        self.check("verify_email", code)?;
        Ok("u-new".to_string())
    }

    async fn set_basic_info(&self, user_id: &str, _info: &BasicInfo) -> Result<(), ApiError> {
        self.check("set_basic_info", user_id)
    }

    async fn set_offerings(&self, _user_id: &str, tags: &[String]) -> Result<(), ApiError> {
        self.check("set_offerings", &tags.join(","))
    }

    async fn upload_profile_photo(
        &self,
        _user_id: &str,
        image: ImageUpload,
    ) -> Result<(), ApiError> {
        self.check("upload_profile_photo", &image.file_name)
    }

    async fn create_listing(&self, _user_id: &str, listing: NewListing) -> Result<(), ApiError> {
        self.check("create_listing", &listing.title)
    }

    async fn edit_listing(&self, listing_id: &str, edit: &ListingEdit) -> Result<(), ApiError> {
        self.check("edit_listing", &format!("{listing_id} {}", edit.field()))
    }

    async fn delete_listing_conversations(&self, listing_id: &str) -> Result<(), ApiError> {
        self.check("delete_listing_conversations", listing_id)
    }

    async fn delete_listing(&self, listing_id: &str) -> Result<(), ApiError> {
        self.check("delete_listing", listing_id)
    }
}

/// A listing with an image, offered by `offerer-<id>`.
pub fn listing(id: &str) -> Listing {
    Listing {
        id: id.to_string(),
        title: format!("Listing {id}"),
        long_description: "A well-loved item".to_string(),
        image_url: Some(format!("https://cdn.test/{id}.png")),
        price: 10.0,
        listing_type: ListingType::Listing,
        transaction_type: TransactionType::Sell,
        tags: vec!["Books".to_string(), "Furniture".to_string()],
        profile_offerer_id: format!("offerer-{id}"),
    }
}

/// A listing without an image reference.
pub fn listing_without_image(id: &str) -> Listing {
    Listing {
        image_url: None,
        ..listing(id)
    }
}

pub fn listings(ids: &[&str]) -> Vec<Listing> {
    ids.iter().map(|id| listing(id)).collect()
}

pub fn profile(fname: &str, lname: &str) -> PublicProfile {
    PublicProfile {
        fname: fname.to_string(),
        lname: lname.to_string(),
        email: format!("{}@campus.test", fname.to_lowercase()),
        interests: "Books%20Bikes".to_string(),
        offerings: "Tutoring".to_string(),
        ..PublicProfile::default()
    }
}

/// Creates a test App for user `u1` backed by an empty `FakeMarketplace`.
pub fn test_app() -> crate::core::state::App {
    app_with(FakeMarketplace::default())
}

pub fn app_with(api: FakeMarketplace) -> crate::core::state::App {
    crate::core::state::App::new(Arc::new(api), "u1".to_string())
}
