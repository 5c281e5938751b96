//! Dashboard use-case services.
//!
//! # Responsibility
//! - Normalize caller input and delegate persistence to repositories.
//! - Log every failed write as a metadata-only event.
//! - Publish change events after successful commits.
//!
//! # Invariants
//! - Services never bypass repository validation.
//! - List operations log fetch failures and return an empty result.
//! - Log lines carry ids and counts, never user-entered text.

use crate::model::widget::WidgetKind;
use crate::model::{EntityId, ValidationError};
use crate::repo::{RepoError, RepoResult};
use log::{error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod dashboard;
pub mod goal_service;
pub mod quick_link_service;
pub mod snippet_service;
pub mod widget_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by dashboard services.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any store mutation.
    Validation(ValidationError),
    /// Target entity does not exist.
    NotFound {
        entity: &'static str,
        id: EntityId,
    },
    /// The dashboard already shows a widget of this kind.
    WidgetAlreadyAdded(WidgetKind),
    /// Store-level failure; the write was rolled back.
    Repo(RepoError),
}

impl ServiceError {
    /// Stable machine-readable code used in log lines and FFI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::WidgetAlreadyAdded(_) => "widget_already_added",
            Self::Repo(_) => "store_failed",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::WidgetAlreadyAdded(kind) => {
                write!(f, "widget `{}` is already on the dashboard", kind.as_str())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Maps a repository outcome and logs it when it failed.
pub(crate) fn complete<T>(event: &'static str, result: RepoResult<T>) -> ServiceResult<T> {
    result.map_err(|err| {
        let err = ServiceError::from(err);
        log_failure(event, &err);
        err
    })
}

/// Substitutes an empty list for a failed fetch.
pub(crate) fn fetch_or_empty<T>(event: &'static str, result: RepoResult<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(err) => {
            error!("event={event} module=service status=error error_code=fetch_failed error={err}");
            Vec::new()
        }
    }
}

pub(crate) fn log_failure(event: &'static str, err: &ServiceError) {
    match err {
        ServiceError::Repo(inner) => error!(
            "event={event} module=service status=error error_code={} error={inner}",
            err.code()
        ),
        _ => warn!(
            "event={event} module=service status=rejected error_code={}",
            err.code()
        ),
    }
}
