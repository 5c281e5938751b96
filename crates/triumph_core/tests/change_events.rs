use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use triumph_core::{
    open_db_in_memory, ChangeEvent, ChangeKind, ChangeObserver, Collection, Dashboard, NewTask,
};

#[derive(Default)]
struct Counter {
    seen: AtomicUsize,
}

impl ChangeObserver for Counter {
    fn on_change(&self, _event: &ChangeEvent) {
        self.seen.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn committed_writes_reach_filtered_subscribers() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let (_, links_rx) = dashboard
        .notifier()
        .subscribe_channel(Some(Collection::QuickLinks));
    let (_, all_rx) = dashboard.notifier().subscribe_channel(None);

    let link = dashboard
        .quick_links()
        .create_quick_link("Docs", "https://docs.rs")
        .unwrap();
    dashboard.goals().create_goal("Launch", None).unwrap();

    let received = links_rx.try_iter().collect::<Vec<_>>();
    assert_eq!(
        received,
        vec![ChangeEvent::inserted(Collection::QuickLinks, link.id)]
    );
    assert_eq!(all_rx.try_iter().count(), 2);
}

#[test]
fn rejected_writes_publish_nothing() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let (_, rx) = dashboard.notifier().subscribe_channel(None);

    assert!(dashboard
        .quick_links()
        .create_quick_link("", "https://docs.rs")
        .is_err());
    assert!(dashboard.goals().create_goal("   ", None).is_err());

    assert_eq!(rx.try_iter().count(), 0);
}

#[test]
fn goal_delete_announces_each_removed_task() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let goal = dashboard.goals().create_goal("Launch", None).unwrap();
    let first = dashboard
        .goals()
        .create_task(goal.id, NewTask::new("Draft plan"))
        .unwrap();
    let second = dashboard
        .goals()
        .create_task(goal.id, NewTask::new("Ship"))
        .unwrap();

    let (_, tasks_rx) = dashboard.notifier().subscribe_channel(Some(Collection::Tasks));
    let (_, goals_rx) = dashboard.notifier().subscribe_channel(Some(Collection::Goals));
    dashboard.goals().delete_goal(goal.id).unwrap();

    let task_events = tasks_rx.try_iter().collect::<Vec<_>>();
    assert_eq!(task_events.len(), 2);
    assert!(task_events.iter().all(|event| event.kind == ChangeKind::Deleted));
    let ids = task_events.iter().map(|event| event.id).collect::<Vec<_>>();
    assert!(ids.contains(&first.id) && ids.contains(&second.id));
    assert_eq!(
        goals_rx.try_iter().collect::<Vec<_>>(),
        vec![ChangeEvent::deleted(Collection::Goals, goal.id)]
    );
}

#[test]
fn shared_notifier_outlives_the_dashboard() {
    let counter = Arc::new(Counter::default());
    let notifier = triumph_core::ChangeNotifier::new();
    let id = notifier.subscribe(Some(Collection::WidgetConfigs), counter.clone());

    {
        let conn = open_db_in_memory().unwrap();
        let dashboard = Dashboard::with_notifier(&conn, notifier.clone()).unwrap();
        dashboard
            .widgets()
            .add_widget(triumph_core::WidgetKind::Goals)
            .unwrap();
        dashboard.snippets().delete_all_snippets().unwrap();
    }

    assert_eq!(counter.seen.load(Ordering::SeqCst), 1);
    assert!(notifier.unsubscribe(id));
    assert_eq!(notifier.subscriber_count(), 0);
}
