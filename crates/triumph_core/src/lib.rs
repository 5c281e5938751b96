//! Persistence core for the Triumph Board dashboard.
//!
//! Owns the SQLite store for quick links, goals with tasks, knowledge
//! snippets and widget configurations. Presentation code talks to
//! [`Dashboard`] and listens on its [`ChangeNotifier`].

pub mod db;
pub mod events;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use events::{ChangeEvent, ChangeKind, ChangeNotifier, ChangeObserver, Collection};
pub use logging::{default_log_level, init_logging, level_from_env, logging_status, LoggingError};
pub use model::goal::{Goal, GoalProgress, NewGoal, NewTask, Task, TaskPriority};
pub use model::quick_link::{NewQuickLink, QuickLink};
pub use model::snippet::{NewSnippet, Snippet, SnippetEdit, SnippetListQuery};
pub use model::widget::{WidgetConfig, WidgetKind};
pub use model::{EntityId, ValidationError};
pub use repo::{RepoError, RepoResult};
pub use service::dashboard::Dashboard;
pub use service::{ServiceError, ServiceResult};

/// Health check used by the FFI layer.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_matches_manifest() {
        assert_eq!(core_version(), "0.1.0");
    }
}
