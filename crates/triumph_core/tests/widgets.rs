use triumph_core::{open_db_in_memory, Dashboard, ServiceError, WidgetKind};

#[test]
fn add_widget_refuses_a_second_quicklinks_panel() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let widgets = dashboard.widgets();

    let first = widgets.add_widget(WidgetKind::QuickLinks).unwrap();
    assert_eq!(first.kind, WidgetKind::QuickLinks);
    assert_eq!(first.display_order, 0);

    assert!(matches!(
        widgets.add_widget(WidgetKind::QuickLinks),
        Err(ServiceError::WidgetAlreadyAdded(WidgetKind::QuickLinks))
    ));
    assert_eq!(
        widgets.available_widget_kinds(),
        vec![WidgetKind::Goals, WidgetKind::Snippets]
    );
    assert_eq!(widgets.list_widget_configs(), vec![first]);
}

#[test]
fn raw_create_does_not_check_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let widgets = dashboard.widgets();

    widgets
        .create_widget_config(WidgetKind::QuickLinks, None)
        .unwrap();
    let second = widgets
        .create_widget_config(WidgetKind::QuickLinks, Some(vec![1, 2, 3]))
        .unwrap();
    assert_eq!(second.display_order, 1);
    assert_eq!(second.payload, Some(vec![1, 2, 3]));

    let quick = widgets.list_widget_configs_of_kind(WidgetKind::QuickLinks);
    assert_eq!(quick.len(), 2);
    assert!(widgets.list_widget_configs_of_kind(WidgetKind::Goals).is_empty());
}

#[test]
fn deleting_a_widget_makes_its_kind_available_again() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let widgets = dashboard.widgets();

    assert_eq!(widgets.available_widget_kinds(), WidgetKind::ALL.to_vec());
    let goals = widgets.add_widget(WidgetKind::Goals).unwrap();
    let snippets = widgets.add_widget(WidgetKind::Snippets).unwrap();
    assert_eq!(snippets.display_order, 1);

    widgets.delete_widget_config(goals.id).unwrap();
    assert!(widgets.available_widget_kinds().contains(&WidgetKind::Goals));
    assert!(matches!(
        widgets.delete_widget_config(goals.id),
        Err(ServiceError::NotFound { .. })
    ));
}

#[test]
fn add_widget_stores_initial_payload_once() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let widgets = dashboard.widgets();

    let config = widgets
        .add_widget_with_payload(WidgetKind::Snippets, Some(b"{\"rows\":4}".to_vec()))
        .unwrap();
    assert_eq!(config.payload.as_deref(), Some(&b"{\"rows\":4}"[..]));
    assert_eq!(widgets.list_widget_configs(), vec![config]);

    assert!(matches!(
        widgets.add_widget_with_payload(WidgetKind::Snippets, Some(vec![9])),
        Err(ServiceError::WidgetAlreadyAdded(WidgetKind::Snippets))
    ));
}
