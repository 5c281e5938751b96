//! Quick link repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Listing is deterministic: `display_order ASC, date_added ASC, uuid ASC`.
//! - New links take the next global display order.

use super::ordering::{next_display_order_i32, OrderScope};
use super::{ensure_connection_ready, narrow_order, parse_uuid, RepoError, RepoResult};
use crate::model::quick_link::{NewQuickLink, QuickLink};
use crate::model::{now_epoch_ms, EntityId};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const QUICK_LINK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    url,
    date_added,
    display_order
FROM quick_links";

/// Repository interface for quick links.
pub trait QuickLinkRepository {
    fn create_quick_link(&self, link: &NewQuickLink) -> RepoResult<QuickLink>;
    fn get_quick_link(&self, id: EntityId) -> RepoResult<Option<QuickLink>>;
    fn list_quick_links(&self) -> RepoResult<Vec<QuickLink>>;
    fn delete_quick_link(&self, id: EntityId) -> RepoResult<()>;
}

/// SQLite-backed quick link repository.
#[derive(Clone, Copy)]
pub struct SqliteQuickLinkRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuickLinkRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["quick_links"])?;
        Ok(Self { conn })
    }
}

impl QuickLinkRepository for SqliteQuickLinkRepository<'_> {
    fn create_quick_link(&self, link: &NewQuickLink) -> RepoResult<QuickLink> {
        link.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let created = QuickLink {
            id: Uuid::new_v4(),
            title: link.title.clone(),
            url: link.url.clone(),
            date_added: now_epoch_ms(),
            display_order: next_display_order_i32(&tx, OrderScope::QuickLinks)?,
        };
        tx.execute(
            "INSERT INTO quick_links (uuid, title, url, date_added, display_order)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                created.id.to_string(),
                created.title.as_str(),
                created.url.as_str(),
                created.date_added,
                created.display_order,
            ],
        )?;
        tx.commit()?;

        Ok(created)
    }

    fn get_quick_link(&self, id: EntityId) -> RepoResult<Option<QuickLink>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{QUICK_LINK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_quick_link_row(row)?));
        }
        Ok(None)
    }

    fn list_quick_links(&self) -> RepoResult<Vec<QuickLink>> {
        let mut stmt = self.conn.prepare(&format!(
            "{QUICK_LINK_SELECT_SQL} ORDER BY display_order ASC, date_added ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(parse_quick_link_row(row)?);
        }
        Ok(links)
    }

    fn delete_quick_link(&self, id: EntityId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "DELETE FROM quick_links WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "quick link",
                id,
            });
        }
        tx.commit()?;
        Ok(())
    }
}

fn parse_quick_link_row(row: &Row<'_>) -> RepoResult<QuickLink> {
    let uuid_text: String = row.get("uuid")?;
    Ok(QuickLink {
        id: parse_uuid(&uuid_text, "quick_links.uuid")?,
        title: row.get("title")?,
        url: row.get("url")?,
        date_added: row.get("date_added")?,
        display_order: narrow_order(row.get("display_order")?, "quick_links.display_order")?,
    })
}
