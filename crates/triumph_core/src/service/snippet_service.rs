//! Knowledge snippet use-case service.
//!
//! # Invariants
//! - Blank content is rejected on create and on update; a rejected update
//!   leaves the stored snippet untouched.
//! - Saving an edit stamps `last_accessed`.

use super::{complete, fetch_or_empty, ServiceError, ServiceResult};
use crate::events::{ChangeEvent, ChangeNotifier, Collection};
use crate::model::snippet::{NewSnippet, Snippet, SnippetEdit, SnippetListQuery};
use crate::model::{now_epoch_ms, EntityId};
use crate::repo::snippet_repo::SnippetRepository;
use log::info;

/// Snippet facade over a repository implementation.
pub struct SnippetService<R: SnippetRepository> {
    repo: R,
    notifier: ChangeNotifier,
}

impl<R: SnippetRepository> SnippetService<R> {
    pub fn new(repo: R, notifier: ChangeNotifier) -> Self {
        Self { repo, notifier }
    }

    /// Persists a snippet; `is_favorite` starts `false`.
    pub fn create_snippet(&self, snippet: NewSnippet) -> ServiceResult<Snippet> {
        let input = snippet.normalized();
        let created = complete("snippet_create", self.repo.create_snippet(&input))?;
        info!(
            "event=snippet_create module=service status=ok id={} display_order={}",
            created.id, created.display_order
        );
        self.notifier
            .publish(ChangeEvent::inserted(Collection::Snippets, created.id));
        Ok(created)
    }

    pub fn get_snippet(&self, id: EntityId) -> ServiceResult<Snippet> {
        complete("snippet_get", self.repo.get_snippet(id))?.ok_or(ServiceError::NotFound {
            entity: "knowledge snippet",
            id,
        })
    }

    /// Snippets newest first; empty on fetch failure.
    pub fn list_snippets(&self, query: &SnippetListQuery) -> Vec<Snippet> {
        fetch_or_empty("snippet_list", self.repo.list_snippets(query))
    }

    /// Saves an edit of all user-editable fields.
    pub fn update_snippet(&self, id: EntityId, edit: SnippetEdit) -> ServiceResult<Snippet> {
        let edit = edit.normalized();
        let updated = complete(
            "snippet_update",
            self.repo.update_snippet(id, &edit, now_epoch_ms()),
        )?;
        info!("event=snippet_update module=service status=ok id={id}");
        self.notifier
            .publish(ChangeEvent::updated(Collection::Snippets, id));
        Ok(updated)
    }

    /// Flips the favorite flag and returns the new value.
    pub fn toggle_favorite(&self, id: EntityId) -> ServiceResult<bool> {
        let current = self.get_snippet(id)?;
        let favorite = !current.is_favorite;
        complete("snippet_toggle_favorite", self.repo.set_favorite(id, favorite))?;
        self.notifier
            .publish(ChangeEvent::updated(Collection::Snippets, id));
        Ok(favorite)
    }

    /// Stamps `last_accessed` with the current time and returns it.
    pub fn touch_last_accessed(&self, id: EntityId) -> ServiceResult<i64> {
        let accessed_at = now_epoch_ms();
        complete(
            "snippet_touch",
            self.repo.set_last_accessed(id, accessed_at),
        )?;
        self.notifier
            .publish(ChangeEvent::updated(Collection::Snippets, id));
        Ok(accessed_at)
    }

    pub fn delete_snippet(&self, id: EntityId) -> ServiceResult<()> {
        complete("snippet_delete", self.repo.delete_snippet(id))?;
        info!("event=snippet_delete module=service status=ok id={id}");
        self.notifier
            .publish(ChangeEvent::deleted(Collection::Snippets, id));
        Ok(())
    }

    /// Removes every snippet; returns the removed count.
    pub fn delete_all_snippets(&self) -> ServiceResult<usize> {
        let ids = complete(
            "snippet_delete_all",
            self.repo.list_snippets(&SnippetListQuery::default()),
        )?
        .into_iter()
        .map(|snippet| snippet.id)
        .collect::<Vec<_>>();
        let removed = complete("snippet_delete_all", self.repo.delete_all_snippets())?;
        info!("event=snippet_delete_all module=service status=ok removed={removed}");

        for id in ids {
            self.notifier
                .publish(ChangeEvent::deleted(Collection::Snippets, id));
        }
        Ok(removed)
    }
}
