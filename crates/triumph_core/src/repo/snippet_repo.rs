//! Knowledge snippet repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Blank content never reaches the table (validated here, CHECKed in SQL).
//! - Listing is newest first: `date_created DESC, display_order DESC`.
//! - Snippet display order is a 64-bit namespace of its own.

use super::ordering::{next_display_order, OrderScope};
use super::{bool_to_int, ensure_connection_ready, parse_bool, parse_uuid, RepoError, RepoResult};
use crate::model::snippet::{NewSnippet, Snippet, SnippetEdit, SnippetListQuery};
use crate::model::{now_epoch_ms, EntityId};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const SNIPPET_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    content,
    language,
    tags,
    date_created,
    last_accessed,
    is_favorite,
    display_order
FROM knowledge_snippets";

/// Repository interface for knowledge snippets.
pub trait SnippetRepository {
    fn create_snippet(&self, snippet: &NewSnippet) -> RepoResult<Snippet>;
    fn get_snippet(&self, id: EntityId) -> RepoResult<Option<Snippet>>;
    fn list_snippets(&self, query: &SnippetListQuery) -> RepoResult<Vec<Snippet>>;
    /// Replaces editable fields and stamps `last_accessed = accessed_at`.
    fn update_snippet(
        &self,
        id: EntityId,
        edit: &SnippetEdit,
        accessed_at: i64,
    ) -> RepoResult<Snippet>;
    fn set_favorite(&self, id: EntityId, favorite: bool) -> RepoResult<()>;
    fn set_last_accessed(&self, id: EntityId, accessed_at: i64) -> RepoResult<()>;
    fn delete_snippet(&self, id: EntityId) -> RepoResult<()>;
    /// Deletes every snippet; returns removed count.
    fn delete_all_snippets(&self) -> RepoResult<usize>;
}

/// SQLite-backed snippet repository.
#[derive(Clone, Copy)]
pub struct SqliteSnippetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnippetRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["knowledge_snippets"])?;
        Ok(Self { conn })
    }
}

impl SnippetRepository for SqliteSnippetRepository<'_> {
    fn create_snippet(&self, snippet: &NewSnippet) -> RepoResult<Snippet> {
        snippet.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let created = Snippet {
            id: Uuid::new_v4(),
            title: snippet.title.clone(),
            content: snippet.content.clone(),
            language: snippet.language.clone(),
            tags: snippet.tags.clone(),
            date_created: now_epoch_ms(),
            last_accessed: None,
            is_favorite: false,
            display_order: next_display_order(&tx, OrderScope::Snippets)?,
        };
        tx.execute(
            "INSERT INTO knowledge_snippets (
                uuid,
                title,
                content,
                language,
                tags,
                date_created,
                last_accessed,
                is_favorite,
                display_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, 0, ?7);",
            params![
                created.id.to_string(),
                created.title.as_deref(),
                created.content.as_str(),
                created.language.as_deref(),
                created.tags.as_deref(),
                created.date_created,
                created.display_order,
            ],
        )?;
        tx.commit()?;

        Ok(created)
    }

    fn get_snippet(&self, id: EntityId) -> RepoResult<Option<Snippet>> {
        load_snippet(self.conn, id)
    }

    fn list_snippets(&self, query: &SnippetListQuery) -> RepoResult<Vec<Snippet>> {
        let mut sql = format!("{SNIPPET_SELECT_SQL} WHERE 1 = 1");
        if query.favorites_only {
            sql.push_str(" AND is_favorite = 1");
        }
        sql.push_str(" ORDER BY date_created DESC, display_order DESC, uuid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut snippets = Vec::new();
        while let Some(row) = rows.next()? {
            let snippet = parse_snippet_row(row)?;
            // Tags are a free-form string column, so exact tag matching happens
            // after the row is parsed.
            if let Some(tag) = query.tag.as_deref() {
                if !snippet.has_tag(tag) {
                    continue;
                }
            }
            snippets.push(snippet);
        }
        Ok(snippets)
    }

    fn update_snippet(
        &self,
        id: EntityId,
        edit: &SnippetEdit,
        accessed_at: i64,
    ) -> RepoResult<Snippet> {
        edit.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE knowledge_snippets
             SET
                title = ?2,
                content = ?3,
                language = ?4,
                tags = ?5,
                is_favorite = ?6,
                last_accessed = ?7
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                edit.title.as_deref(),
                edit.content.as_str(),
                edit.language.as_deref(),
                edit.tags.as_deref(),
                bool_to_int(edit.is_favorite),
                accessed_at,
            ],
        )?;
        if changed == 0 {
            return Err(snippet_not_found(id));
        }
        let updated = load_snippet(&tx, id)?.ok_or_else(|| snippet_not_found(id))?;
        tx.commit()?;

        Ok(updated)
    }

    fn set_favorite(&self, id: EntityId, favorite: bool) -> RepoResult<()> {
        self.update_single_column(
            id,
            "UPDATE knowledge_snippets SET is_favorite = ?2 WHERE uuid = ?1;",
            bool_to_int(favorite),
        )
    }

    fn set_last_accessed(&self, id: EntityId, accessed_at: i64) -> RepoResult<()> {
        self.update_single_column(
            id,
            "UPDATE knowledge_snippets SET last_accessed = ?2 WHERE uuid = ?1;",
            accessed_at,
        )
    }

    fn delete_snippet(&self, id: EntityId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "DELETE FROM knowledge_snippets WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(snippet_not_found(id));
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_all_snippets(&self) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed = tx.execute("DELETE FROM knowledge_snippets;", [])?;
        tx.commit()?;
        Ok(removed)
    }
}

impl SqliteSnippetRepository<'_> {
    fn update_single_column(&self, id: EntityId, sql: &str, value: i64) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(sql, params![id.to_string(), value])?;
        if changed == 0 {
            return Err(snippet_not_found(id));
        }
        tx.commit()?;
        Ok(())
    }
}

fn load_snippet(conn: &Connection, id: EntityId) -> RepoResult<Option<Snippet>> {
    let mut stmt = conn.prepare(&format!("{SNIPPET_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_snippet_row(row)?));
    }
    Ok(None)
}

fn snippet_not_found(id: EntityId) -> RepoError {
    RepoError::NotFound {
        entity: "knowledge snippet",
        id,
    }
}

fn parse_snippet_row(row: &Row<'_>) -> RepoResult<Snippet> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Snippet {
        id: parse_uuid(&uuid_text, "knowledge_snippets.uuid")?,
        title: row.get("title")?,
        content: row.get("content")?,
        language: row.get("language")?,
        tags: row.get("tags")?,
        date_created: row.get("date_created")?,
        last_accessed: row.get("last_accessed")?,
        is_favorite: parse_bool(row.get("is_favorite")?, "knowledge_snippets.is_favorite")?,
        display_order: row.get("display_order")?,
    })
}
