//! Dashboard data access facade.
//!
//! # Responsibility
//! - Build every collection service over one migrated connection.
//! - Hand out the shared change notifier for UI subscriptions.
//!
//! # Invariants
//! - All services publish through the same `ChangeNotifier`.
//! - Construction fails when the connection is not fully migrated.

use super::goal_service::GoalService;
use super::quick_link_service::QuickLinkService;
use super::snippet_service::SnippetService;
use super::widget_service::WidgetService;
use crate::events::ChangeNotifier;
use crate::repo::goal_repo::SqliteGoalRepository;
use crate::repo::quick_link_repo::SqliteQuickLinkRepository;
use crate::repo::snippet_repo::SqliteSnippetRepository;
use crate::repo::widget_repo::SqliteWidgetRepository;
use crate::repo::RepoResult;
use rusqlite::Connection;

/// Entry point passed to presentation code.
pub struct Dashboard<'conn> {
    quick_links: QuickLinkService<SqliteQuickLinkRepository<'conn>>,
    goals: GoalService<SqliteGoalRepository<'conn>>,
    snippets: SnippetService<SqliteSnippetRepository<'conn>>,
    widgets: WidgetService<SqliteWidgetRepository<'conn>>,
    notifier: ChangeNotifier,
}

impl<'conn> Dashboard<'conn> {
    /// Builds the facade with a fresh notifier.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_notifier(conn, ChangeNotifier::new())
    }

    /// Builds the facade around an existing notifier, so subscriptions can
    /// outlive one connection.
    pub fn with_notifier(conn: &'conn Connection, notifier: ChangeNotifier) -> RepoResult<Self> {
        Ok(Self {
            quick_links: QuickLinkService::new(
                SqliteQuickLinkRepository::try_new(conn)?,
                notifier.clone(),
            ),
            goals: GoalService::new(SqliteGoalRepository::try_new(conn)?, notifier.clone()),
            snippets: SnippetService::new(
                SqliteSnippetRepository::try_new(conn)?,
                notifier.clone(),
            ),
            widgets: WidgetService::new(SqliteWidgetRepository::try_new(conn)?, notifier.clone()),
            notifier,
        })
    }

    pub fn quick_links(&self) -> &QuickLinkService<SqliteQuickLinkRepository<'conn>> {
        &self.quick_links
    }

    pub fn goals(&self) -> &GoalService<SqliteGoalRepository<'conn>> {
        &self.goals
    }

    pub fn snippets(&self) -> &SnippetService<SqliteSnippetRepository<'conn>> {
        &self.snippets
    }

    pub fn widgets(&self) -> &WidgetService<SqliteWidgetRepository<'conn>> {
        &self.widgets
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}
