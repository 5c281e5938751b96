//! Quick link use-case service.

use super::{complete, fetch_or_empty, ServiceError, ServiceResult};
use crate::events::{ChangeEvent, ChangeNotifier, Collection};
use crate::model::quick_link::{NewQuickLink, QuickLink};
use crate::model::EntityId;
use crate::repo::quick_link_repo::QuickLinkRepository;
use log::info;

/// Quick link facade over a repository implementation.
pub struct QuickLinkService<R: QuickLinkRepository> {
    repo: R,
    notifier: ChangeNotifier,
}

impl<R: QuickLinkRepository> QuickLinkService<R> {
    pub fn new(repo: R, notifier: ChangeNotifier) -> Self {
        Self { repo, notifier }
    }

    /// Creates a link at the end of the quick links list.
    ///
    /// # Contract
    /// - Title and URL are trimmed; blank values and URLs without a scheme
    ///   are rejected before any write.
    pub fn create_quick_link(
        &self,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> ServiceResult<QuickLink> {
        let input = NewQuickLink::new(title, url);
        let link = complete("quick_link_create", self.repo.create_quick_link(&input))?;
        info!(
            "event=quick_link_create module=service status=ok id={} display_order={}",
            link.id, link.display_order
        );
        self.notifier
            .publish(ChangeEvent::inserted(Collection::QuickLinks, link.id));
        Ok(link)
    }

    pub fn delete_quick_link(&self, id: EntityId) -> ServiceResult<()> {
        complete("quick_link_delete", self.repo.delete_quick_link(id))?;
        info!("event=quick_link_delete module=service status=ok id={id}");
        self.notifier
            .publish(ChangeEvent::deleted(Collection::QuickLinks, id));
        Ok(())
    }

    pub fn get_quick_link(&self, id: EntityId) -> ServiceResult<QuickLink> {
        complete("quick_link_get", self.repo.get_quick_link(id))?.ok_or(ServiceError::NotFound {
            entity: "quick link",
            id,
        })
    }

    /// Links in display order; empty on fetch failure.
    pub fn list_quick_links(&self) -> Vec<QuickLink> {
        fetch_or_empty("quick_link_list", self.repo.list_quick_links())
    }
}
