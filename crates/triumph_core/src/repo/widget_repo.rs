//! Widget configuration repository contracts and SQLite implementation.
//!
//! # Invariants
//! - The store does not enforce one configuration per kind; that rule lives
//!   in the widget service's add flow.
//! - Listing is deterministic: `display_order ASC, uuid ASC`.

use super::ordering::{next_display_order_i32, OrderScope};
use super::{ensure_connection_ready, narrow_order, parse_uuid, RepoError, RepoResult};
use crate::model::widget::{WidgetConfig, WidgetKind};
use crate::model::EntityId;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const WIDGET_SELECT_SQL: &str = "SELECT
    uuid,
    kind,
    display_order,
    payload
FROM widget_configs";

/// Repository interface for dashboard widget configurations.
pub trait WidgetRepository {
    fn create_widget_config(
        &self,
        kind: WidgetKind,
        payload: Option<&[u8]>,
    ) -> RepoResult<WidgetConfig>;
    /// Lists configurations, optionally restricted to one kind.
    fn list_widget_configs(&self, kind: Option<WidgetKind>) -> RepoResult<Vec<WidgetConfig>>;
    fn delete_widget_config(&self, id: EntityId) -> RepoResult<()>;
}

/// SQLite-backed widget configuration repository.
#[derive(Clone, Copy)]
pub struct SqliteWidgetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWidgetRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["widget_configs"])?;
        Ok(Self { conn })
    }
}

impl WidgetRepository for SqliteWidgetRepository<'_> {
    fn create_widget_config(
        &self,
        kind: WidgetKind,
        payload: Option<&[u8]>,
    ) -> RepoResult<WidgetConfig> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let created = WidgetConfig {
            id: Uuid::new_v4(),
            kind,
            display_order: next_display_order_i32(&tx, OrderScope::WidgetConfigs)?,
            payload: payload.map(<[u8]>::to_vec),
        };
        tx.execute(
            "INSERT INTO widget_configs (uuid, kind, display_order, payload)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                created.id.to_string(),
                kind.as_str(),
                created.display_order,
                created.payload.as_deref(),
            ],
        )?;
        tx.commit()?;

        Ok(created)
    }

    fn list_widget_configs(&self, kind: Option<WidgetKind>) -> RepoResult<Vec<WidgetConfig>> {
        let mut configs = Vec::new();
        match kind {
            Some(kind) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{WIDGET_SELECT_SQL} WHERE kind = ?1 ORDER BY display_order ASC, uuid ASC;"
                ))?;
                let mut rows = stmt.query([kind.as_str()])?;
                while let Some(row) = rows.next()? {
                    configs.push(parse_widget_row(row)?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "{WIDGET_SELECT_SQL} ORDER BY display_order ASC, uuid ASC;"
                ))?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    configs.push(parse_widget_row(row)?);
                }
            }
        }
        Ok(configs)
    }

    fn delete_widget_config(&self, id: EntityId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "DELETE FROM widget_configs WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "widget config",
                id,
            });
        }
        tx.commit()?;
        Ok(())
    }
}

fn parse_widget_row(row: &Row<'_>) -> RepoResult<WidgetConfig> {
    let uuid_text: String = row.get("uuid")?;
    let kind_text: String = row.get("kind")?;
    let kind = WidgetKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid widget kind `{kind_text}` in widget_configs.kind"
        ))
    })?;

    Ok(WidgetConfig {
        id: parse_uuid(&uuid_text, "widget_configs.uuid")?,
        kind,
        display_order: narrow_order(row.get("display_order")?, "widget_configs.display_order")?,
        payload: row.get("payload")?,
    })
}
