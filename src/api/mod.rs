//! # Marketplace API
//!
//! Typed records for the backend's JSON and the [`MarketplaceApi`] seam the
//! rest of the client talks through. [`HttpMarketplace`] is the real
//! implementation; tests provide their own.

pub mod client;
pub mod http;
pub mod types;

pub use client::{ApiError, MarketplaceApi};
pub use http::HttpMarketplace;
pub use types::{
    BasicInfo, ConversationStub, ConversationSummary, ImageUpload, Listing, ListingEdit,
    ListingType, Message, NewListing, PublicProfile, SwipeKind, TransactionType,
};
