use triumph_core::{open_db_in_memory, Dashboard, ServiceError, ValidationError};

#[test]
fn display_orders_follow_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let links = dashboard.quick_links();

    let titles = ["Docs", "Mail", "Calendar", "Repo"];
    for title in titles {
        links
            .create_quick_link(title, format!("https://example.com/{title}"))
            .unwrap();
    }

    let listed = links.list_quick_links();
    let orders = listed.iter().map(|link| link.display_order).collect::<Vec<_>>();
    let listed_titles = listed.iter().map(|link| link.title.as_str()).collect::<Vec<_>>();
    assert_eq!(orders, vec![0, 1, 2, 3]);
    assert_eq!(listed_titles, titles);
}

#[test]
fn input_is_trimmed_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();

    let link = dashboard
        .quick_links()
        .create_quick_link("  Docs  ", " https://docs.rs ")
        .unwrap();
    assert_eq!(link.title, "Docs");
    assert_eq!(link.url, "https://docs.rs");
    assert!(link.date_added > 0);

    let loaded = dashboard.quick_links().get_quick_link(link.id).unwrap();
    assert_eq!(loaded, link);
}

#[test]
fn invalid_input_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let links = dashboard.quick_links();

    assert!(matches!(
        links.create_quick_link("", "https://docs.rs"),
        Err(ServiceError::Validation(ValidationError::BlankField("title")))
    ));
    assert!(matches!(
        links.create_quick_link("Docs", "docs.rs"),
        Err(ServiceError::Validation(ValidationError::InvalidUrl(_)))
    ));
    assert!(links.list_quick_links().is_empty());

    let first = links.create_quick_link("Docs", "https://docs.rs").unwrap();
    assert_eq!(first.display_order, 0);
}

#[test]
fn delete_keeps_remaining_orders_and_appends_after_max() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let links = dashboard.quick_links();

    let first = links.create_quick_link("A", "https://a.example").unwrap();
    let second = links.create_quick_link("B", "https://b.example").unwrap();
    links.delete_quick_link(second.id).unwrap();

    let third = links.create_quick_link("C", "https://c.example").unwrap();
    assert_eq!(third.display_order, 1);

    links.delete_quick_link(first.id).unwrap();
    assert!(matches!(
        links.get_quick_link(first.id),
        Err(ServiceError::NotFound { entity: "quick link", .. })
    ));
    assert!(matches!(
        links.delete_quick_link(first.id),
        Err(ServiceError::NotFound { .. })
    ));
    assert_eq!(links.list_quick_links(), vec![third]);
}
