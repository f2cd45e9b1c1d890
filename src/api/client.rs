use std::fmt;

use async_trait::async_trait;

use super::types::{
    BasicInfo, ConversationSummary, ImageUpload, Listing, ListingEdit, Message, NewListing,
    PublicProfile, SwipeKind, SuperlikeResponse,
};

/// Errors that can occur while talking to the marketplace backend.
/// Every screen catches these at the call site and degrades; none are fatal.
#[derive(Debug)]
pub enum ApiError {
    /// Client misconfigured (unusable base URL).
    Config(String),
    /// Transport-level failure (DNS, connection refused, reset).
    Network(String),
    /// Backend answered with a non-2xx status.
    Api { status: u16, message: String },
    /// Body did not have the expected JSON shape.
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// The backend operations the client consumes.
///
/// The TUI only ever holds an `Arc<dyn MarketplaceApi>`, so tests can swap
/// in a fake without a server.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// The feed page for a user, in server relevance order.
    async fn feed_listings(&self, user_id: &str) -> Result<Vec<Listing>, ApiError>;

    /// Records a like or dislike. The response body is ignored.
    async fn record_swipe(
        &self,
        listing_id: &str,
        user_id: &str,
        kind: SwipeKind,
    ) -> Result<(), ApiError>;

    /// Superlike: asks the backend to open a conversation with the offerer.
    async fn start_conversation(
        &self,
        listing_id: &str,
        user_id: &str,
    ) -> Result<SuperlikeResponse, ApiError>;

    /// Downloads an image and discards it, warming whatever cache sits in front.
    async fn prefetch_image(&self, url: &str) -> Result<(), ApiError>;

    async fn public_profile(&self, profile_id: &str) -> Result<PublicProfile, ApiError>;

    /// Full profile access, including the `Interested` listing ids.
    async fn profile(&self, profile_id: &str) -> Result<PublicProfile, ApiError>;

    async fn profile_offerings(&self, profile_id: &str) -> Result<Vec<Listing>, ApiError>;

    async fn listing(&self, listing_id: &str) -> Result<Listing, ApiError>;

    async fn search_listings(&self, query: &str, user_id: &str)
    -> Result<Vec<Listing>, ApiError>;

    /// What the search screen shows before anything has been searched.
    async fn browse_listings(&self, user_id: &str) -> Result<Vec<Listing>, ApiError>;

    /// Takes a listing off the user's saved (liked) list.
    async fn remove_interested(&self, listing_id: &str, user_id: &str) -> Result<(), ApiError>;

    async fn conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>, ApiError>;

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), ApiError>;

    async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError>;

    async fn send_message(
        &self,
        conversation_id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<(), ApiError>;

    /// Exchanges credentials for a user id.
    async fn login(&self, email: &str, password: &str) -> Result<String, ApiError>;

    /// Starts sign-up; the backend emails a verification code.
    async fn request_signup(&self, email: &str, password: &str) -> Result<(), ApiError>;

    /// Redeems an emailed code for the new user's id.
    async fn verify_email(&self, code: &str) -> Result<String, ApiError>;

    async fn set_basic_info(&self, user_id: &str, info: &BasicInfo) -> Result<(), ApiError>;

    /// Replaces the tags describing what the user can offer.
    async fn set_offerings(&self, user_id: &str, tags: &[String]) -> Result<(), ApiError>;

    async fn upload_profile_photo(&self, user_id: &str, image: ImageUpload)
    -> Result<(), ApiError>;

    async fn create_listing(&self, user_id: &str, listing: NewListing) -> Result<(), ApiError>;

    async fn edit_listing(&self, listing_id: &str, edit: &ListingEdit) -> Result<(), ApiError>;

    /// Removes every conversation about a listing, ahead of deleting it.
    async fn delete_listing_conversations(&self, listing_id: &str) -> Result<(), ApiError>;

    async fn delete_listing(&self, listing_id: &str) -> Result<(), ApiError>;
}
