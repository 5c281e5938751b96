//! Dashboard widget use-case service.
//!
//! `create_widget_config` stores whatever it is given. The add-widget flow
//! (`add_widget`, `available_widget_kinds`) is where one-per-kind holds.

use super::{complete, fetch_or_empty, log_failure, ServiceError, ServiceResult};
use crate::events::{ChangeEvent, ChangeNotifier, Collection};
use crate::model::widget::{WidgetConfig, WidgetKind};
use crate::model::EntityId;
use crate::repo::widget_repo::WidgetRepository;
use log::info;

/// Widget configuration facade over a repository implementation.
pub struct WidgetService<R: WidgetRepository> {
    repo: R,
    notifier: ChangeNotifier,
}

impl<R: WidgetRepository> WidgetService<R> {
    pub fn new(repo: R, notifier: ChangeNotifier) -> Self {
        Self { repo, notifier }
    }

    /// Appends a widget configuration without any duplicate check.
    pub fn create_widget_config(
        &self,
        kind: WidgetKind,
        payload: Option<Vec<u8>>,
    ) -> ServiceResult<WidgetConfig> {
        let config = complete(
            "widget_create",
            self.repo.create_widget_config(kind, payload.as_deref()),
        )?;
        info!(
            "event=widget_create module=service status=ok id={} kind={} display_order={}",
            config.id,
            kind.as_str(),
            config.display_order
        );
        self.notifier
            .publish(ChangeEvent::inserted(Collection::WidgetConfigs, config.id));
        Ok(config)
    }

    /// Add-widget flow: refuses a kind that is already on the dashboard.
    pub fn add_widget(&self, kind: WidgetKind) -> ServiceResult<WidgetConfig> {
        self.add_widget_with_payload(kind, None)
    }

    /// Add-widget flow carrying an initial widget payload.
    pub fn add_widget_with_payload(
        &self,
        kind: WidgetKind,
        payload: Option<Vec<u8>>,
    ) -> ServiceResult<WidgetConfig> {
        let existing = complete("widget_add", self.repo.list_widget_configs(Some(kind)))?;
        if !existing.is_empty() {
            let err = ServiceError::WidgetAlreadyAdded(kind);
            log_failure("widget_add", &err);
            return Err(err);
        }
        self.create_widget_config(kind, payload)
    }

    /// Kinds not yet on the dashboard, in menu order.
    pub fn available_widget_kinds(&self) -> Vec<WidgetKind> {
        let placed = self.list_widget_configs();
        WidgetKind::ALL
            .into_iter()
            .filter(|kind| !placed.iter().any(|config| config.kind == *kind))
            .collect()
    }

    /// All configurations in dashboard order; empty on fetch failure.
    pub fn list_widget_configs(&self) -> Vec<WidgetConfig> {
        fetch_or_empty("widget_list", self.repo.list_widget_configs(None))
    }

    /// Configurations of one kind in display order; empty on fetch failure.
    pub fn list_widget_configs_of_kind(&self, kind: WidgetKind) -> Vec<WidgetConfig> {
        fetch_or_empty("widget_list", self.repo.list_widget_configs(Some(kind)))
    }

    pub fn delete_widget_config(&self, id: EntityId) -> ServiceResult<()> {
        complete("widget_delete", self.repo.delete_widget_config(id))?;
        info!("event=widget_delete module=service status=ok id={id}");
        self.notifier
            .publish(ChangeEvent::deleted(Collection::WidgetConfigs, id));
        Ok(())
    }
}
