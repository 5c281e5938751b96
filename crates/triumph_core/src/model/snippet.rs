//! Knowledge snippet entity.
//!
//! # Invariants
//! - `content` is never blank in the store; a blank draft is simply never
//!   written, so cancelling one leaves nothing behind.
//! - `display_order` uses its own 64-bit namespace.

use super::{normalize_optional, require_text, EntityId, ValidationError};
use serde::{Deserialize, Serialize};

/// Stored code snippet or technical note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: EntityId,
    pub title: Option<String>,
    pub content: String,
    /// Language or type tag such as `rust` or `sql`.
    pub language: Option<String>,
    /// Raw comma-separated tag string as entered.
    pub tags: Option<String>,
    /// Epoch ms.
    pub date_created: i64,
    /// Epoch ms.
    pub last_accessed: Option<i64>,
    pub is_favorite: bool,
    pub display_order: i64,
}

impl Snippet {
    /// Tags split on commas, trimmed, blanks dropped.
    pub fn tag_list(&self) -> Vec<String> {
        split_tags(self.tags.as_deref().unwrap_or_default())
    }

    /// Case-insensitive exact tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim();
        self.tag_list()
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(wanted))
    }
}

/// Input for creating a snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSnippet {
    pub title: Option<String>,
    pub content: String,
    pub language: Option<String>,
    pub tags: Option<String>,
}

impl NewSnippet {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Folds blank optional fields to `None` and rewrites tags as `a, b`.
    /// Content is kept verbatim.
    pub fn normalized(self) -> Self {
        Self {
            title: normalize_optional(self.title),
            content: self.content,
            language: normalize_optional(self.language),
            tags: canonical_tags(self.tags),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("snippet content", &self.content)
    }
}

/// Full replacement of the user-editable snippet fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetEdit {
    pub title: Option<String>,
    pub content: String,
    pub language: Option<String>,
    pub tags: Option<String>,
    pub is_favorite: bool,
}

impl SnippetEdit {
    /// Starts an edit from the current stored values.
    pub fn from_snippet(snippet: &Snippet) -> Self {
        Self {
            title: snippet.title.clone(),
            content: snippet.content.clone(),
            language: snippet.language.clone(),
            tags: snippet.tags.clone(),
            is_favorite: snippet.is_favorite,
        }
    }

    pub fn normalized(self) -> Self {
        Self {
            title: normalize_optional(self.title),
            content: self.content,
            language: normalize_optional(self.language),
            tags: canonical_tags(self.tags),
            is_favorite: self.is_favorite,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("snippet content", &self.content)
    }
}

/// Filters for snippet listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetListQuery {
    pub favorites_only: bool,
    /// Exact tag match, case-insensitive.
    pub tag: Option<String>,
}

/// Splits a comma-separated tag string.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins tags back into the stored `a, b, c` form.
pub(crate) fn join_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn canonical_tags(raw: Option<String>) -> Option<String> {
    let tags = split_tags(raw.as_deref().unwrap_or_default());
    if tags.is_empty() {
        None
    } else {
        Some(join_tags(&tags))
    }
}
