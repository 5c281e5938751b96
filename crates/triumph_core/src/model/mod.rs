//! Dashboard domain model.
//!
//! # Responsibility
//! - Define the five persisted entity shapes and their input records.
//! - Own field-level validation that must pass before any store mutation.
//!
//! # Invariants
//! - Every entity is identified by a stable `EntityId` assigned at creation.
//! - Timestamps are Unix epoch milliseconds.
//! - Deletion is a hard delete; there are no tombstones.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub mod goal;
pub mod quick_link;
pub mod snippet;
pub mod widget;

/// Stable identifier shared by every dashboard entity.
pub type EntityId = Uuid;

/// Field validation failure raised before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    BlankField(&'static str),
    /// URL is missing a `scheme://` prefix or contains whitespace.
    InvalidUrl(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::InvalidUrl(value) => write!(f, "invalid url `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

/// Trims optional text and folds blank values to `None`.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_optional, now_epoch_ms, require_text, ValidationError};

    #[test]
    fn require_text_rejects_whitespace() {
        assert_eq!(
            require_text("title", "  \t"),
            Err(ValidationError::BlankField("title"))
        );
        assert!(require_text("title", " ok ").is_ok());
    }

    #[test]
    fn normalize_optional_folds_blank_to_none() {
        assert_eq!(normalize_optional(Some("   ".to_string())), None);
        assert_eq!(
            normalize_optional(Some(" rust ".to_string())),
            Some("rust".to_string())
        );
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn clock_is_after_2020() {
        assert!(now_epoch_ms() > 1_577_836_800_000);
    }
}
