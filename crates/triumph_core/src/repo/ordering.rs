//! Display order assignment.
//!
//! The next order of a collection is the current highest value plus one, or
//! zero for an empty collection. Tasks are numbered per owning goal.
//!
//! # Invariants
//! - Callers run the lookup and the insert inside the same IMMEDIATE
//!   transaction, so only one writer can observe a given maximum.

use super::{narrow_order, RepoError, RepoResult};
use crate::model::EntityId;
use rusqlite::{Connection, OptionalExtension};

/// Collection (or goal-scoped sub-collection) that receives a new order value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    QuickLinks,
    Goals,
    TasksOf(EntityId),
    Snippets,
    WidgetConfigs,
}

impl OrderScope {
    fn table(self) -> &'static str {
        match self {
            Self::QuickLinks => "quick_links",
            Self::Goals => "goals",
            Self::TasksOf(_) => "tasks",
            Self::Snippets => "knowledge_snippets",
            Self::WidgetConfigs => "widget_configs",
        }
    }
}

/// Returns the next display order in `scope` as a 64-bit value.
pub fn next_display_order(conn: &Connection, scope: OrderScope) -> RepoResult<i64> {
    let last: Option<i64> = match scope {
        OrderScope::TasksOf(goal_id) => conn
            .query_row(
                "SELECT display_order
                 FROM tasks
                 WHERE goal_uuid = ?1
                 ORDER BY display_order DESC
                 LIMIT 1;",
                [goal_id.to_string()],
                |row| row.get(0),
            )
            .optional()?,
        other => conn
            .query_row(
                &format!(
                    "SELECT display_order
                     FROM {}
                     ORDER BY display_order DESC
                     LIMIT 1;",
                    other.table()
                ),
                [],
                |row| row.get(0),
            )
            .optional()?,
    };

    match last {
        None => Ok(0),
        Some(value) => value.checked_add(1).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "display order exhausted in {}",
                scope.table()
            ))
        }),
    }
}

/// Same as [`next_display_order`], narrowed to the 32-bit namespaces.
pub fn next_display_order_i32(conn: &Connection, scope: OrderScope) -> RepoResult<i32> {
    let next = next_display_order(conn, scope)?;
    narrow_order(next, scope.table())
}
