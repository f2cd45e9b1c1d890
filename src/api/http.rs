//! reqwest-backed implementation of [`MarketplaceApi`].
//!
//! Every endpoint is built from the configured base URL with
//! `path_segments_mut`, so user-supplied pieces (search queries, ids) are
//! percent-encoded as path segments rather than spliced into a string.

use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::client::{ApiError, MarketplaceApi};
use super::types::{
    BasicInfo, ConversationSummary, ImageUpload, Listing, ListingEdit, LoginResponse, Message,
    MessageDocument, NewListing, PublicProfile, SuperlikeResponse, SwipeKind, decode_listings,
    verified_user_id,
};

pub struct HttpMarketplace {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpMarketplace {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::Config(format!("invalid base URL '{base_url}': {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "base URL '{base_url}' cannot carry a path"
            )));
        }
        info!("Marketplace client targeting {}", parsed);
        Ok(Self {
            base_url: parsed,
            client: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn endpoint_with_query(
        &self,
        segments: &[&str],
        key: &str,
        value: &str,
    ) -> Result<Url, ApiError> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut().append_pair(key, value);
        Ok(url)
    }

    /// Sends a request and turns transport failures and non-2xx statuses into errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        debug!("{} {}", response.status(), response.url().path());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let url = response.url().path().to_string();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Backend error on {}: {} - {}", url, status, message);
            return Err(ApiError::Api { status, message });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| {
            warn!("Unexpected response shape: {} (body: {})", e, body);
            ApiError::Parse(e.to_string())
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.send(self.client.get(url)).await?;
        Self::decode(response).await
    }

    /// A JSON array of listings. Records that don't decode are skipped.
    async fn get_listings(&self, url: Url) -> Result<Vec<Listing>, ApiError> {
        let values: Vec<serde_json::Value> = self.get_json(url).await?;
        let total = values.len();
        let listings = decode_listings(values);
        if listings.len() < total {
            warn!("Dropped {} of {} listings that failed to decode", total - listings.len(), total);
        }
        Ok(listings)
    }

    fn image_part(image: ImageUpload) -> Result<Part, ApiError> {
        Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime)
            .map_err(|e| ApiError::Config(format!("invalid image type: {e}")))
    }
}

#[async_trait]
impl MarketplaceApi for HttpMarketplace {
    async fn feed_listings(&self, user_id: &str) -> Result<Vec<Listing>, ApiError> {
        let url = self.endpoint(&["algo", "get-feed-listings", user_id])?;
        let listings = self.get_listings(url).await?;
        info!("Fetched {} feed listings for {}", listings.len(), user_id);
        Ok(listings)
    }

    async fn record_swipe(
        &self,
        listing_id: &str,
        user_id: &str,
        kind: SwipeKind,
    ) -> Result<(), ApiError> {
        let url = self.endpoint_with_query(&["feed", kind.endpoint(), listing_id], "uid", user_id)?;
        self.send(self.client.get(url)).await?;
        debug!("Recorded {:?} on listing {}", kind, listing_id);
        Ok(())
    }

    async fn start_conversation(
        &self,
        listing_id: &str,
        user_id: &str,
    ) -> Result<SuperlikeResponse, ApiError> {
        let url = self.endpoint_with_query(&["feed", "swipe-down", listing_id], "uid", user_id)?;
        self.get_json(url).await
    }

    async fn prefetch_image(&self, url: &str) -> Result<(), ApiError> {
        let parsed = Url::parse(url)
            .map_err(|e| ApiError::Config(format!("invalid image URL '{url}': {e}")))?;
        let response = self.send(self.client.get(parsed)).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        debug!("Prefetched {} bytes from {}", bytes.len(), url);
        Ok(())
    }

    async fn public_profile(&self, profile_id: &str) -> Result<PublicProfile, ApiError> {
        let url = self.endpoint(&["profile", "public-profile-access", profile_id])?;
        self.get_json(url).await
    }

    async fn profile(&self, profile_id: &str) -> Result<PublicProfile, ApiError> {
        let url = self.endpoint(&["profile", "profile-access", profile_id])?;
        self.get_json(url).await
    }

    async fn profile_offerings(&self, profile_id: &str) -> Result<Vec<Listing>, ApiError> {
        let url = self.endpoint(&["profile", "get-profile-offerings", profile_id])?;
        self.get_listings(url).await
    }

    async fn listing(&self, listing_id: &str) -> Result<Listing, ApiError> {
        let url = self.endpoint(&["listings", "get-listing", listing_id])?;
        self.get_json(url).await
    }

    async fn search_listings(
        &self,
        query: &str,
        user_id: &str,
    ) -> Result<Vec<Listing>, ApiError> {
        let url = self.endpoint_with_query(
            &["algo", "get-search-listings", query],
            "profile_id",
            user_id,
        )?;
        let listings = self.get_listings(url).await?;
        info!("Search '{}' returned {} listings", query, listings.len());
        Ok(listings)
    }

    async fn browse_listings(&self, user_id: &str) -> Result<Vec<Listing>, ApiError> {
        let url = self.endpoint(&["listings", "get-all-listings-limited", user_id])?;
        self.get_listings(url).await
    }

    async fn remove_interested(&self, listing_id: &str, user_id: &str) -> Result<(), ApiError> {
        let url =
            self.endpoint_with_query(&["profile", "remove-interested", listing_id], "uid", user_id)?;
        self.send(self.client.get(url)).await?;
        info!("Removed listing {} from saved for {}", listing_id, user_id);
        Ok(())
    }

    async fn conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>, ApiError> {
        let url = self.endpoint(&["conversations", "get-all-conversations", user_id])?;
        self.get_json(url).await
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["conversations", "delete-conversation", conversation_id])?;
        self.send(self.client.get(url)).await?;
        info!("Deleted conversation {}", conversation_id);
        Ok(())
    }

    async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError> {
        let url = self.endpoint(&["conversations", "get-all-messages", conversation_id])?;
        let value: serde_json::Value = self.get_json(url).await?;
        // A conversation with no messages may come back as an empty array.
        if value.as_array().is_some_and(|items| items.is_empty()) {
            return Ok(Vec::new());
        }
        let documents: HashMap<String, MessageDocument> =
            serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(Message::from_documents(documents))
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["conversations", "send-message", conversation_id, user_id])?;
        let body = json!({ "message_contents": text });
        self.send(self.client.post(url).json(&body)).await?;
        debug!("Sent message to conversation {}", conversation_id);
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["login", "login", ""])?;
        let form = Form::new()
            .text("email", email.to_string())
            .text("password", password.to_string());

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body: LoginResponse = Self::decode(response).await?;
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body.detail.unwrap_or_else(|| "Invalid credentials".to_string()),
            });
        }
        body.uid
            .filter(|uid| !uid.is_empty())
            .ok_or_else(|| ApiError::Parse("login response has no uid".to_string()))
    }

    async fn request_signup(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["onboarding", "email-verification", ""])?;
        let form = Form::new()
            .text("email", email.to_string())
            .text("password", password.to_string());
        self.send(self.client.post(url).multipart(form)).await?;
        info!("Verification code requested for {}", email);
        Ok(())
    }

    async fn verify_email(&self, code: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["onboarding", "code-entry", code.trim()])?;
        let body: serde_json::Value = self.get_json(url).await?;
        verified_user_id(&body).ok_or_else(|| {
            warn!("Code entry response has no user id: {}", body);
            ApiError::Parse("verification response has no user id".to_string())
        })
    }

    async fn set_basic_info(&self, user_id: &str, info: &BasicInfo) -> Result<(), ApiError> {
        let url = self.endpoint(&["onboarding", "basic-info", user_id])?;
        self.send(self.client.post(url).json(info)).await?;
        debug!("Saved basic info for {}", user_id);
        Ok(())
    }

    async fn set_offerings(&self, user_id: &str, tags: &[String]) -> Result<(), ApiError> {
        // The query value is space-joined; the backend reads it decoded.
        let url = self.endpoint_with_query(
            &["onboarding", "profile-offerings", user_id],
            "offerings",
            &tags.join(" "),
        )?;
        self.send(self.client.post(url)).await?;
        debug!("Saved {} offering tags for {}", tags.len(), user_id);
        Ok(())
    }

    async fn upload_profile_photo(
        &self,
        user_id: &str,
        image: ImageUpload,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["onboarding", "profile-photo", user_id])?;
        let form = Form::new().part("image", Self::image_part(image)?);
        self.send(self.client.post(url).multipart(form)).await?;
        info!("Uploaded profile photo for {}", user_id);
        Ok(())
    }

    async fn create_listing(&self, user_id: &str, listing: NewListing) -> Result<(), ApiError> {
        let url = self.endpoint(&["listings", "create-listing"])?;
        let tags = listing.tags_field();
        let price = listing.price_field();
        let mut form = Form::new()
            .text("title", listing.title)
            .text("long_description", listing.long_description)
            .text("listing_type", listing.listing_type.as_str())
            .text("transaction_type", listing.transaction_type.as_str())
            .text("profile_offerer_id", user_id.to_string())
            .text("price", price)
            .text("tags", tags);

        if let Some(image) = listing.image {
            form = form.part("image", Self::image_part(image)?);
        }

        self.send(self.client.post(url).multipart(form)).await?;
        info!("Created listing for {}", user_id);
        Ok(())
    }

    async fn edit_listing(&self, listing_id: &str, edit: &ListingEdit) -> Result<(), ApiError> {
        let url = self.endpoint(&["listings", edit.endpoint(), listing_id])?;
        let form = Form::new().text(edit.field(), edit.value());
        self.send(self.client.post(url).multipart(form)).await?;
        info!("Listing {}: {} updated", listing_id, edit.field());
        Ok(())
    }

    async fn delete_listing_conversations(&self, listing_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["listings", listing_id, "conversations"])?;
        self.send(self.client.delete(url)).await?;
        debug!("Cleared conversations for listing {}", listing_id);
        Ok(())
    }

    async fn delete_listing(&self, listing_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["listings", "delete-listing", listing_id])?;
        self.send(self.client.get(url)).await?;
        info!("Deleted listing {}", listing_id);
        Ok(())
    }
}
