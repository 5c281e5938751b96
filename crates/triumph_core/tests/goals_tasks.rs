use rusqlite::Connection;
use triumph_core::{
    open_db_in_memory, Dashboard, NewTask, ServiceError, TaskPriority, ValidationError,
};

fn task_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn launch_goal_reports_half_done() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let goals = dashboard.goals();

    let launch = goals.create_goal("Launch", None).unwrap();
    let draft_plan = goals.create_task(launch.id, NewTask::new("Draft plan")).unwrap();
    let ship = goals.create_task(launch.id, NewTask::new("Ship")).unwrap();
    assert_eq!(draft_plan.priority, TaskPriority::Medium);
    assert!(!draft_plan.is_completed);
    assert_eq!((draft_plan.display_order, ship.display_order), (0, 1));

    goals.set_task_completed(draft_plan.id, true).unwrap();

    let progress = goals.goal_progress(launch.id).unwrap();
    assert_eq!((progress.completed, progress.total), (1, 2));
    assert_eq!(progress.percent(), 50);
    assert!(!progress.is_complete());
}

#[test]
fn task_order_is_scoped_per_goal() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let goals = dashboard.goals();

    let first = goals.create_goal("Health", None).unwrap();
    let second = goals.create_goal("Career", Some("  ".to_string())).unwrap();
    assert_eq!((first.display_order, second.display_order), (0, 1));
    assert_eq!(second.description, None);

    for text in ["Run", "Stretch", "Sleep"] {
        goals.create_task(first.id, NewTask::new(text)).unwrap();
    }
    let other = goals.create_task(second.id, NewTask::new("Update CV")).unwrap();
    assert_eq!(other.display_order, 0);

    let orders = goals
        .list_tasks(first.id)
        .iter()
        .map(|task| task.display_order)
        .collect::<Vec<_>>();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[test]
fn deleting_goal_removes_all_of_its_tasks() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let goals = dashboard.goals();

    let doomed = goals.create_goal("Doomed", None).unwrap();
    let kept = goals.create_goal("Kept", None).unwrap();
    for text in ["one", "two", "three"] {
        goals.create_task(doomed.id, NewTask::new(text)).unwrap();
    }
    goals.create_task(kept.id, NewTask::new("survivor")).unwrap();

    assert_eq!(goals.delete_goal(doomed.id).unwrap(), 3);
    assert!(goals.list_tasks(doomed.id).is_empty());
    assert_eq!(task_count(&conn), 1);
    assert!(matches!(
        goals.get_goal(doomed.id),
        Err(ServiceError::NotFound { entity: "goal", .. })
    ));
    assert_eq!(goals.list_goals(), vec![kept]);
}

#[test]
fn goal_with_initial_tasks_is_all_or_nothing() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let goals = dashboard.goals();

    let rejected = goals.create_goal_with_tasks(
        "Trip",
        None,
        vec![NewTask::new("Book flights"), NewTask::new("   ")],
    );
    assert!(matches!(
        rejected,
        Err(ServiceError::Validation(ValidationError::BlankField("task text")))
    ));
    assert!(goals.list_goals().is_empty());
    assert_eq!(task_count(&conn), 0);

    let (goal, tasks) = goals
        .create_goal_with_tasks(
            "Trip",
            Some("Summer".to_string()),
            vec![
                NewTask::new(" Book flights ").with_priority(TaskPriority::High),
                NewTask::new("Pack").with_due_date(1_700_000_000_000),
            ],
        )
        .unwrap();
    assert_eq!(goal.description.as_deref(), Some("Summer"));
    assert_eq!(tasks[0].text, "Book flights");
    assert_eq!(tasks[0].priority, TaskPriority::High);
    assert_eq!(tasks[1].due_date, Some(1_700_000_000_000));
    assert_eq!(goals.list_tasks(goal.id), tasks);
}

#[test]
fn toggling_and_deleting_tasks() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let goals = dashboard.goals();

    let goal = goals.create_goal("Read", None).unwrap();
    let task = goals.create_task(goal.id, NewTask::new("Chapter 1")).unwrap();

    assert!(goals.toggle_task_completed(task.id).unwrap());
    assert!(goals.get_task(task.id).unwrap().is_completed);
    assert!(!goals.toggle_task_completed(task.id).unwrap());
    assert!(!goals.get_task(task.id).unwrap().is_completed);

    goals.delete_task(task.id).unwrap();
    let progress = goals.goal_progress(goal.id).unwrap();
    assert_eq!((progress.completed, progress.total), (0, 0));
    assert!(matches!(
        goals.delete_task(task.id),
        Err(ServiceError::NotFound { entity: "task", .. })
    ));
}

#[test]
fn tasks_need_an_existing_goal() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let goals = dashboard.goals();

    let goal = goals.create_goal("Temp", None).unwrap();
    goals.delete_goal(goal.id).unwrap();

    assert!(matches!(
        goals.create_task(goal.id, NewTask::new("orphan")),
        Err(ServiceError::NotFound { entity: "goal", .. })
    ));
    assert_eq!(task_count(&conn), 0);
}

#[test]
fn description_can_be_set_and_cleared() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let goals = dashboard.goals();

    let goal = goals.create_goal("Write", None).unwrap();
    goals
        .set_goal_description(goal.id, Some(" A novel ".to_string()))
        .unwrap();
    assert_eq!(
        goals.get_goal(goal.id).unwrap().description.as_deref(),
        Some("A novel")
    );

    goals.set_goal_description(goal.id, None).unwrap();
    assert_eq!(goals.get_goal(goal.id).unwrap().description, None);
}

#[test]
fn failed_goal_delete_keeps_goal_and_tasks() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let goals = dashboard.goals();

    let goal = goals.create_goal("Sticky", None).unwrap();
    goals.create_task(goal.id, NewTask::new("one")).unwrap();
    goals.create_task(goal.id, NewTask::new("two")).unwrap();

    conn.execute_batch(
        "CREATE TRIGGER block_goal_delete BEFORE DELETE ON goals
         BEGIN SELECT RAISE(ABORT, 'goal delete blocked'); END;",
    )
    .unwrap();

    let err = goals.delete_goal(goal.id).unwrap_err();
    assert!(matches!(err, ServiceError::Repo(_)));
    assert_eq!(err.code(), "store_failed");
    assert_eq!(goals.get_goal(goal.id).unwrap(), goal);
    assert_eq!(goals.list_tasks(goal.id).len(), 2);
    assert_eq!(task_count(&conn), 2);
}

#[test]
fn failed_task_insert_discards_the_new_goal() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = Dashboard::try_new(&conn).unwrap();
    let goals = dashboard.goals();

    conn.execute_batch(
        "CREATE TRIGGER block_task_insert BEFORE INSERT ON tasks
         WHEN NEW.text = 'Unbookable'
         BEGIN SELECT RAISE(ABORT, 'task insert blocked'); END;",
    )
    .unwrap();

    let result = goals.create_goal_with_tasks(
        "Trip",
        None,
        vec![NewTask::new("Book flights"), NewTask::new("Unbookable")],
    );
    assert!(matches!(result, Err(ServiceError::Repo(_))));
    assert!(goals.list_goals().is_empty());
    assert_eq!(task_count(&conn), 0);

    let (goal, tasks) = goals
        .create_goal_with_tasks("Trip", None, vec![NewTask::new("Book flights")])
        .unwrap();
    assert_eq!(goal.display_order, 0);
    assert_eq!(tasks.len(), 1);
}
