use anyhow::{bail, Context, Result};
use regex::Regex;

use crate::models::Post;

/// A non-digit, a 1-2 digit group with an optional thousands comma, exactly three digits,
/// then a non-digit. Prices at the very start or end of the text never match.
pub const DEFAULT_PRICE_PATTERN: &str = r"[^0-9]([0-9]{1,2},?[0-9]{3})[^0-9]";

/// Hebrew for "rooms", as written after the room count in local listings
pub const DEFAULT_ROOMS_WORD: &str = "חדרים";

/// Text conventions the extractor looks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRules {
    /// Regex whose first capture group holds the price digits (commas allowed)
    pub price_pattern: String,
    /// Word that follows a single-digit room count
    pub rooms_word: String,
}

impl Default for ExtractRules {
    fn default() -> Self {
        Self {
            price_pattern: DEFAULT_PRICE_PATTERN.to_string(),
            rooms_word: DEFAULT_ROOMS_WORD.to_string(),
        }
    }
}

/// Heuristic price and room count detection over free post text
#[derive(Debug, Clone)]
pub struct Extractor {
    price_re: Regex,
    rooms_re: Regex,
}

impl Extractor {
    pub fn new(rules: &ExtractRules) -> Result<Self> {
        let price_re = Regex::new(&rules.price_pattern)
            .with_context(|| format!("Invalid price pattern: {}", rules.price_pattern))?;
        if price_re.captures_len() < 2 {
            bail!(
                "Price pattern must have a capture group for the amount: {}",
                rules.price_pattern
            );
        }

        let rooms_word = rules.rooms_word.trim();
        if rooms_word.is_empty() {
            bail!("Rooms word must not be empty");
        }
        let rooms_re = Regex::new(&format!("([0-9]) {}", regex::escape(rooms_word)))
            .context("Failed to build rooms pattern")?;

        Ok(Self { price_re, rooms_re })
    }

    /// First price-shaped amount in the text, commas stripped
    pub fn extract_price(&self, text: &str) -> Option<i64> {
        let caps = self.price_re.captures(text)?;
        let digits: String = caps.get(1)?.as_str().chars().filter(|c| *c != ',').collect();
        digits.parse().ok()
    }

    /// Digit directly before the first occurrence of the rooms word
    pub fn extract_rooms(&self, text: &str) -> Option<u32> {
        let caps = self.rooms_re.captures(text)?;
        caps.get(1)?.as_str().parse().ok()
    }

    pub fn append_price(&self, post: &mut Post) {
        if let Some(price) = self.extract_price(&post.text) {
            post.price = Some(price);
        }
    }

    pub fn append_rooms(&self, post: &mut Post) {
        if let Some(rooms) = self.extract_rooms(&post.text) {
            post.rooms = Some(rooms);
        }
    }

    /// Fill price and rooms from the text. Existing values survive a non-match.
    pub fn append_details(&self, post: &mut Post) {
        self.append_price(post);
        self.append_rooms(post);
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(&ExtractRules::default()).expect("Built-in extraction patterns must compile")
    }
}
