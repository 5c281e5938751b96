//! Goal/task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist goals and the tasks they own.
//! - Own the goal -> task cascade delete.
//!
//! # Invariants
//! - Task display order is assigned per owning goal.
//! - Task listing is deterministic: `display_order ASC, date_created ASC`.
//! - Goal delete removes child tasks first, then the goal, in one commit.

use super::ordering::{next_display_order_i32, OrderScope};
use super::{
    bool_to_int, ensure_connection_ready, narrow_order, parse_bool, parse_uuid, RepoError,
    RepoResult,
};
use crate::model::goal::{Goal, GoalProgress, NewGoal, NewTask, Task, TaskPriority};
use crate::model::{now_epoch_ms, EntityId};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const GOAL_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    date_created,
    display_order
FROM goals";

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    goal_uuid,
    text,
    due_date,
    priority,
    is_completed,
    date_created,
    display_order
FROM tasks";

/// Repository interface for goals and their tasks.
pub trait GoalRepository {
    /// Creates one goal with the next global order.
    fn create_goal(&self, goal: &NewGoal) -> RepoResult<Goal>;
    /// Creates one goal and its initial tasks in a single commit.
    fn create_goal_with_tasks(
        &self,
        goal: &NewGoal,
        tasks: &[NewTask],
    ) -> RepoResult<(Goal, Vec<Task>)>;
    fn get_goal(&self, id: EntityId) -> RepoResult<Option<Goal>>;
    /// Lists goals in display order.
    fn list_goals(&self) -> RepoResult<Vec<Goal>>;
    fn set_goal_description(&self, id: EntityId, description: Option<&str>) -> RepoResult<()>;
    /// Deletes a goal and every task it owns; returns removed task count.
    fn delete_goal(&self, id: EntityId) -> RepoResult<usize>;
    /// Creates one task under `goal_id` with the next goal-scoped order.
    fn create_task(&self, goal_id: EntityId, task: &NewTask) -> RepoResult<Task>;
    fn get_task(&self, id: EntityId) -> RepoResult<Option<Task>>;
    /// Lists tasks of one goal in display order.
    fn list_tasks(&self, goal_id: EntityId) -> RepoResult<Vec<Task>>;
    fn set_task_completed(&self, id: EntityId, completed: bool) -> RepoResult<()>;
    fn delete_task(&self, id: EntityId) -> RepoResult<()>;
    /// Counts completed and total tasks of one goal.
    fn goal_progress(&self, goal_id: EntityId) -> RepoResult<GoalProgress>;
}

/// SQLite-backed goal/task repository.
#[derive(Clone, Copy)]
pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["goals", "tasks"])?;
        Ok(Self { conn })
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(&self, goal: &NewGoal) -> RepoResult<Goal> {
        goal.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let created = insert_goal(&tx, goal)?;
        tx.commit()?;
        Ok(created)
    }

    fn create_goal_with_tasks(
        &self,
        goal: &NewGoal,
        tasks: &[NewTask],
    ) -> RepoResult<(Goal, Vec<Task>)> {
        goal.validate()?;
        for task in tasks {
            task.validate()?;
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let created_goal = insert_goal(&tx, goal)?;
        let mut created_tasks = Vec::with_capacity(tasks.len());
        for task in tasks {
            created_tasks.push(insert_task(&tx, created_goal.id, task)?);
        }
        tx.commit()?;

        Ok((created_goal, created_tasks))
    }

    fn get_goal(&self, id: EntityId) -> RepoResult<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_goal_row(row)?));
        }
        Ok(None)
    }

    fn list_goals(&self) -> RepoResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL} ORDER BY display_order ASC, date_created ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }

    fn set_goal_description(&self, id: EntityId, description: Option<&str>) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE goals SET description = ?2 WHERE uuid = ?1;",
            params![id.to_string(), description],
        )?;
        if changed == 0 {
            return Err(goal_not_found(id));
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_goal(&self, id: EntityId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !goal_exists(&tx, id)? {
            return Err(goal_not_found(id));
        }

        let removed_tasks = tx.execute(
            "DELETE FROM tasks WHERE goal_uuid = ?1;",
            [id.to_string()],
        )?;
        tx.execute("DELETE FROM goals WHERE uuid = ?1;", [id.to_string()])?;
        tx.commit()?;

        Ok(removed_tasks)
    }

    fn create_task(&self, goal_id: EntityId, task: &NewTask) -> RepoResult<Task> {
        task.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !goal_exists(&tx, goal_id)? {
            return Err(goal_not_found(goal_id));
        }
        let created = insert_task(&tx, goal_id, task)?;
        tx.commit()?;
        Ok(created)
    }

    fn get_task(&self, id: EntityId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn list_tasks(&self, goal_id: EntityId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE goal_uuid = ?1
             ORDER BY display_order ASC, date_created ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([goal_id.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn set_task_completed(&self, id: EntityId, completed: bool) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE tasks SET is_completed = ?2 WHERE uuid = ?1;",
            params![id.to_string(), bool_to_int(completed)],
        )?;
        if changed == 0 {
            return Err(task_not_found(id));
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_task(&self, id: EntityId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(task_not_found(id));
        }
        tx.commit()?;
        Ok(())
    }

    fn goal_progress(&self, goal_id: EntityId) -> RepoResult<GoalProgress> {
        if !goal_exists(self.conn, goal_id)? {
            return Err(goal_not_found(goal_id));
        }
        let (completed, total): (u32, u32) = self.conn.query_row(
            "SELECT
                COALESCE(SUM(is_completed), 0),
                COUNT(*)
             FROM tasks
             WHERE goal_uuid = ?1;",
            [goal_id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(GoalProgress { completed, total })
    }
}

fn insert_goal(conn: &Connection, goal: &NewGoal) -> RepoResult<Goal> {
    let created = Goal {
        id: Uuid::new_v4(),
        name: goal.name.clone(),
        description: goal.description.clone(),
        date_created: now_epoch_ms(),
        display_order: next_display_order_i32(conn, OrderScope::Goals)?,
    };
    conn.execute(
        "INSERT INTO goals (uuid, name, description, date_created, display_order)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            created.id.to_string(),
            created.name.as_str(),
            created.description.as_deref(),
            created.date_created,
            created.display_order,
        ],
    )?;
    Ok(created)
}

fn insert_task(conn: &Connection, goal_id: EntityId, task: &NewTask) -> RepoResult<Task> {
    let created = Task {
        id: Uuid::new_v4(),
        goal_id,
        text: task.text.clone(),
        due_date: task.due_date,
        priority: task.priority,
        is_completed: false,
        date_created: now_epoch_ms(),
        display_order: next_display_order_i32(conn, OrderScope::TasksOf(goal_id))?,
    };
    conn.execute(
        "INSERT INTO tasks (
            uuid,
            goal_uuid,
            text,
            due_date,
            priority,
            is_completed,
            date_created,
            display_order
        ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7);",
        params![
            created.id.to_string(),
            goal_id.to_string(),
            created.text.as_str(),
            created.due_date,
            created.priority.as_str(),
            created.date_created,
            created.display_order,
        ],
    )?;
    Ok(created)
}

fn goal_exists(conn: &Connection, id: EntityId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM goals WHERE uuid = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn goal_not_found(id: EntityId) -> RepoError {
    RepoError::NotFound { entity: "goal", id }
}

fn task_not_found(id: EntityId) -> RepoError {
    RepoError::NotFound { entity: "task", id }
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Goal {
        id: parse_uuid(&uuid_text, "goals.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        date_created: row.get("date_created")?,
        display_order: narrow_order(row.get("display_order")?, "goals.display_order")?,
    })
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let goal_text: String = row.get("goal_uuid")?;
    let priority_text: String = row.get("priority")?;
    let priority = TaskPriority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid task priority `{priority_text}` in tasks.priority"
        ))
    })?;

    Ok(Task {
        id: parse_uuid(&uuid_text, "tasks.uuid")?,
        goal_id: parse_uuid(&goal_text, "tasks.goal_uuid")?,
        text: row.get("text")?,
        due_date: row.get("due_date")?,
        priority,
        is_completed: parse_bool(row.get("is_completed")?, "tasks.is_completed")?,
        date_created: row.get("date_created")?,
        display_order: narrow_order(row.get("display_order")?, "tasks.display_order")?,
    })
}
