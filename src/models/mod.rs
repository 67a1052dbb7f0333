use serde::{Deserialize, Serialize};

/// A post as handed over by a group source, before any extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    pub post_id: String,
    pub text: Option<String>,
    pub image: Option<String>,
}

/// One classified listing with the attributes extracted from its text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub text: String,
    /// Asking price in local currency, no symbol
    pub price: Option<i64>,
    pub rooms: Option<u32>,
    pub image_url: Option<String>,
    /// Primary key in the store; never changes once created
    pub post_id: String,
}

impl Post {
    /// Fresh record for a scraped post. Price and rooms are filled in by the extractor.
    pub fn from_raw(raw: RawPost) -> Self {
        Self {
            text: raw.text.unwrap_or_default(),
            price: None,
            rooms: None,
            image_url: raw.image,
            post_id: raw.post_id,
        }
    }
}
