//! Change notification for committed store mutations.
//!
//! # Responsibility
//! - Let presentation code subscribe to per-collection change events.
//! - Fan events out to callback observers and channel receivers.
//!
//! # Invariants
//! - Services publish only after a successful commit.
//! - Observers run outside the registry lock, so an observer may subscribe or
//!   unsubscribe from inside its callback.
//! - A dropped channel receiver never fails a publish.

use crate::model::EntityId;
use log::debug;
use std::collections::BTreeMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

/// Entity collection an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    QuickLinks,
    Goals,
    Tasks,
    Snippets,
    WidgetConfigs,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Self::QuickLinks,
        Self::Goals,
        Self::Tasks,
        Self::Snippets,
        Self::WidgetConfigs,
    ];

    /// Inverse of [`Collection::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|collection| collection.as_str() == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuickLinks => "quick_links",
            Self::Goals => "goals",
            Self::Tasks => "tasks",
            Self::Snippets => "knowledge_snippets",
            Self::WidgetConfigs => "widget_configs",
        }
    }
}

/// Kind of committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

/// One committed mutation of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub kind: ChangeKind,
    pub id: EntityId,
}

impl ChangeEvent {
    pub fn inserted(collection: Collection, id: EntityId) -> Self {
        Self {
            collection,
            kind: ChangeKind::Inserted,
            id,
        }
    }

    pub fn updated(collection: Collection, id: EntityId) -> Self {
        Self {
            collection,
            kind: ChangeKind::Updated,
            id,
        }
    }

    pub fn deleted(collection: Collection, id: EntityId) -> Self {
        Self {
            collection,
            kind: ChangeKind::Deleted,
            id,
        }
    }
}

/// Callback receiver for change events.
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, event: &ChangeEvent);
}

/// Handle returned by subscribe calls, used to unsubscribe.
pub type SubscriptionId = u64;

struct Subscriber {
    filter: Option<Collection>,
    observer: Arc<dyn ChangeObserver>,
}

#[derive(Default)]
struct Registry {
    next_id: SubscriptionId,
    subscribers: BTreeMap<SubscriptionId, Subscriber>,
}

/// Shared, cheaply clonable event hub.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer` for one collection, or all when `filter` is `None`.
    pub fn subscribe(
        &self,
        filter: Option<Collection>,
        observer: Arc<dyn ChangeObserver>,
    ) -> SubscriptionId {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .subscribers
            .insert(id, Subscriber { filter, observer });
        id
    }

    /// Registers a channel subscriber and returns its receiving end.
    pub fn subscribe_channel(
        &self,
        filter: Option<Collection>,
    ) -> (SubscriptionId, Receiver<ChangeEvent>) {
        let (sender, receiver) = channel();
        let id = self.subscribe(filter, Arc::new(ChannelObserver::new(sender)));
        (id, receiver)
    }

    /// Removes a subscriber. Returns `false` when `id` was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().subscribers.remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Delivers `event` to every matching subscriber.
    pub fn publish(&self, event: ChangeEvent) {
        let targets = {
            let registry = self.lock();
            registry
                .subscribers
                .values()
                .filter(|subscriber| {
                    subscriber
                        .filter
                        .map_or(true, |collection| collection == event.collection)
                })
                .map(|subscriber| Arc::clone(&subscriber.observer))
                .collect::<Vec<_>>()
        };

        debug!(
            "event=change_publish module=events collection={} kind={:?} subscribers={}",
            event.collection.as_str(),
            event.kind,
            targets.len()
        );
        for observer in targets {
            observer.on_change(&event);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // Observers never run under this lock; a poisoned map is still consistent.
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

struct ChannelObserver {
    sender: Mutex<Sender<ChangeEvent>>,
}

impl ChannelObserver {
    fn new(sender: Sender<ChangeEvent>) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }
}

impl ChangeObserver for ChannelObserver {
    fn on_change(&self, event: &ChangeEvent) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if sender.send(*event).is_err() {
            debug!(
                "event=change_publish module=events status=receiver_gone collection={}",
                event.collection.as_str()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeEvent, ChangeKind, ChangeNotifier, ChangeObserver, Collection};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use uuid::Uuid;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl ChangeObserver for Counter {
        fn on_change(&self, _event: &ChangeEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn filtered_subscriber_only_sees_its_collection() {
        let notifier = ChangeNotifier::new();
        let (_, goals_rx) = notifier.subscribe_channel(Some(Collection::Goals));
        let (_, all_rx) = notifier.subscribe_channel(None);

        let id = Uuid::new_v4();
        notifier.publish(ChangeEvent::inserted(Collection::QuickLinks, id));
        notifier.publish(ChangeEvent::deleted(Collection::Goals, id));

        let goal_events = goals_rx.try_iter().collect::<Vec<_>>();
        assert_eq!(goal_events.len(), 1);
        assert_eq!(goal_events[0].kind, ChangeKind::Deleted);
        assert_eq!(all_rx.try_iter().count(), 2);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let notifier = ChangeNotifier::new();
        let counter = Arc::new(Counter::default());
        let id = notifier.subscribe(None, counter.clone());

        notifier.publish(ChangeEvent::updated(Collection::Snippets, Uuid::new_v4()));
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.publish(ChangeEvent::updated(Collection::Snippets, Uuid::new_v4()));

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn dropped_receiver_does_not_break_publish() {
        let notifier = ChangeNotifier::new();
        let (_, receiver) = notifier.subscribe_channel(None);
        drop(receiver);

        let counter = Arc::new(Counter::default());
        notifier.subscribe(None, counter.clone());
        notifier.publish(ChangeEvent::inserted(Collection::Tasks, Uuid::new_v4()));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn collection_labels_parse_back() {
        for collection in Collection::ALL {
            assert_eq!(Collection::parse(collection.as_str()), Some(collection));
        }
        assert_eq!(Collection::parse("notes"), None);
    }

    #[test]
    fn clones_share_one_registry() {
        let notifier = ChangeNotifier::new();
        let clone = notifier.clone();
        let (_, receiver) = clone.subscribe_channel(None);
        notifier.publish(ChangeEvent::inserted(Collection::WidgetConfigs, Uuid::new_v4()));
        assert_eq!(receiver.try_iter().count(), 1);
    }
}
