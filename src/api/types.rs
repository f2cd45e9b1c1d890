use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use clap::ValueEnum;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

/// Separator the backend uses when tag lists travel as a single string.
pub const TAG_DELIMITER: &str = "%20";

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListingType {
    Listing,
    Request,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Listing => "Listing",
            ListingType::Request => "Request",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransactionType {
    Lend,
    Sell,
    Borrow,
    Buy,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Lend => "Lend",
            TransactionType::Sell => "Sell",
            TransactionType::Borrow => "Borrow",
            TransactionType::Buy => "Buy",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A marketplace item or request as served by the backend.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Listing {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub long_description: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,
    pub listing_type: ListingType,
    pub transaction_type: TransactionType,
    /// Arrives either as a `%20`-joined string or as an array.
    #[serde(default, deserialize_with = "flexible_tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub profile_offerer_id: String,
}

/// Decodes a page of listings one record at a time. A record that does not
/// fit `Listing` is logged and skipped; the rest of the page is kept.
pub fn decode_listings(values: Vec<serde_json::Value>) -> Vec<Listing> {
    values
        .into_iter()
        .filter_map(|value| {
            let id = value
                .get("id")
                .map(|id| id.to_string())
                .unwrap_or_else(|| "<no id>".to_string());
            match serde_json::from_value::<Listing>(value) {
                Ok(listing) => Some(listing),
                Err(e) => {
                    warn!("Skipping listing {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

impl Listing {
    /// The image reference, if there is a usable one.
    pub fn image_ref(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// The offerer's profile id, if the listing carries one.
    pub fn offerer_id(&self) -> Option<&str> {
        Some(self.profile_offerer_id.as_str()).filter(|id| !id.is_empty())
    }

    pub fn price_label(&self) -> String {
        if self.price <= 0.0 {
            "Free".to_string()
        } else if self.price.fract() == 0.0 {
            format!("${:.0}", self.price)
        } else {
            format!("${:.2}", self.price)
        }
    }
}

/// Public view of a user profile.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PublicProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fname: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lname: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interests: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub offerings: String,
    /// Listing ids this profile has liked.
    #[serde(rename = "Interested", default, deserialize_with = "null_as_empty_vec")]
    pub interested: Vec<String>,
}

impl PublicProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.fname.trim(), self.lname.trim())
            .trim()
            .to_string()
    }

    pub fn interest_tags(&self) -> Vec<String> {
        split_keywords(&self.interests)
    }

    pub fn offering_tags(&self) -> Vec<String> {
        split_keywords(&self.offerings)
    }
}

/// Which recorded swipe to send for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeKind {
    Dislike,
    Like,
}

impl SwipeKind {
    /// Path segment of the matching `/feed/...` endpoint.
    pub fn endpoint(&self) -> &'static str {
        match self {
            SwipeKind::Dislike => "swipe-left",
            SwipeKind::Like => "swipe-right",
        }
    }
}

/// Body returned by the swipe-down (superlike) endpoint.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SuperlikeResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub conversation_id: String,
}

/// Enough about a conversation to open it: who is on the other side and which listing it is about.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationStub {
    pub conversation_id: String,
    pub listing_id: String,
    pub other_user_id: String,
    pub is_offerer: bool,
}

/// One row of the inbox as the backend stores it.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub conversation_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub listing_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub offering_user_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub receiving_user_id: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MessageDocument {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sender_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender_id: String,
    pub timestamp: String,
}

impl Message {
    /// Flattens the backend's `{doc_id: {...}}` object into a list in send order.
    pub fn from_documents(documents: HashMap<String, MessageDocument>) -> Vec<Message> {
        let mut messages: Vec<Message> = documents
            .into_iter()
            .map(|(id, doc)| Message {
                id,
                text: doc.text,
                sender_id: doc.sender_id,
                timestamp: doc.timestamp,
            })
            .collect();
        messages.sort_by(|a, b| {
            parse_timestamp(&a.timestamp)
                .cmp(&parse_timestamp(&b.timestamp))
                .then_with(|| a.timestamp.cmp(&b.timestamp))
                .then_with(|| a.id.cmp(&b.id))
        });
        messages
    }

    /// "HH:MM" when the timestamp parses, otherwise the raw value.
    pub fn time_label(&self) -> String {
        parse_timestamp(&self.timestamp)
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| self.timestamp.clone())
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Image attached to a new listing.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Everything the create-listing form submits.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub long_description: String,
    pub listing_type: ListingType,
    pub transaction_type: TransactionType,
    pub price: Option<f64>,
    pub tags: Vec<String>,
    pub image: Option<ImageUpload>,
}

impl NewListing {
    pub fn tags_field(&self) -> String {
        self.tags.join(TAG_DELIMITER)
    }

    pub fn price_field(&self) -> String {
        self.price.unwrap_or(0.0).to_string()
    }
}

/// A change to one field of an existing listing. Each field has its own
/// endpoint and form field.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingEdit {
    Title(String),
    Description(String),
    Price(f64),
}

impl ListingEdit {
    /// Path segment under `/listings/`.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ListingEdit::Title(_) => "edit-listing-title",
            ListingEdit::Description(_) => "edit-listing-description",
            ListingEdit::Price(_) => "edit-price",
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            ListingEdit::Title(_) => "new_title",
            ListingEdit::Description(_) => "new_desc",
            ListingEdit::Price(_) => "new_price",
        }
    }

    pub fn value(&self) -> String {
        match self {
            ListingEdit::Title(title) => title.clone(),
            ListingEdit::Description(description) => description.clone(),
            ListingEdit::Price(price) => price.to_string(),
        }
    }
}

/// Name and student id collected right after email verification.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BasicInfo {
    pub fname: String,
    pub lname: String,
    #[serde(rename = "tuftsid")]
    pub student_id: String,
}

/// The code-entry endpoint answers with an array whose second element is
/// the new user's id.
pub fn verified_user_id(body: &serde_json::Value) -> Option<String> {
    match body.get(1)? {
        serde_json::Value::String(uid) if !uid.trim().is_empty() => Some(uid.trim().to_string()),
        serde_json::Value::Number(uid) => Some(uid.to_string()),
        _ => None,
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LoginResponse {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Splits a `%20`-joined tag string. Empty pieces are dropped.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits profile keyword strings, which use whitespace or `%20` between words.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.replace(TAG_DELIMITER, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Lenient field decoders
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTags {
    Joined(String),
    List(Vec<String>),
}

fn flexible_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<RawTags>::deserialize(deserializer)? {
        Some(RawTags::Joined(raw)) => split_tags(&raw),
        Some(RawTags::List(items)) => items
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        None => Vec::new(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Option::<RawNumber>::deserialize(deserializer)? {
        Some(RawNumber::Number(n)) => Ok(n),
        Some(RawNumber::Text(text)) if text.trim().is_empty() => Ok(0.0),
        Some(RawNumber::Text(text)) => text
            .trim()
            .trim_start_matches('$')
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid price: {text}"))),
        None => Ok(0.0),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Integer(n) => n.to_string(),
    })
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_vec<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
