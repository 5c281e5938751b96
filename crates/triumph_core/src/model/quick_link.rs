//! Quick link entity.

use super::{require_text, EntityId, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://\S+$").expect("url pattern must compile")
});

/// Bookmark shown by the quick links widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickLink {
    pub id: EntityId,
    pub title: String,
    pub url: String,
    /// Epoch ms.
    pub date_added: i64,
    pub display_order: i32,
}

/// Input for creating a quick link. Fields are trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuickLink {
    pub title: String,
    pub url: String,
}

impl NewQuickLink {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            url: url.into().trim().to_string(),
        }
    }

    /// Checks title/url before any store mutation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("url", &self.url)?;
        if !is_valid_url(&self.url) {
            return Err(ValidationError::InvalidUrl(self.url.clone()));
        }
        Ok(())
    }
}

/// Returns whether `value` looks like an openable `scheme://target` URL.
pub fn is_valid_url(value: &str) -> bool {
    URL_PATTERN.is_match(value)
}
