//! Goal/task use-case service.
//!
//! # Responsibility
//! - Create goals (optionally with initial tasks) and goal-scoped tasks.
//! - Cascade goal deletion to tasks and report progress.
//!
//! # Invariants
//! - Task events are published for every task removed by a goal delete.

use super::{complete, fetch_or_empty, ServiceError, ServiceResult};
use crate::events::{ChangeEvent, ChangeNotifier, Collection};
use crate::model::goal::{Goal, GoalProgress, NewGoal, NewTask, Task};
use crate::model::{normalize_optional, EntityId};
use crate::repo::goal_repo::GoalRepository;
use log::info;

/// Goal/task facade over a repository implementation.
pub struct GoalService<R: GoalRepository> {
    repo: R,
    notifier: ChangeNotifier,
}

impl<R: GoalRepository> GoalService<R> {
    pub fn new(repo: R, notifier: ChangeNotifier) -> Self {
        Self { repo, notifier }
    }

    /// Creates a goal at the end of the goal list and returns it, so callers
    /// can attach tasks right away.
    pub fn create_goal(
        &self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> ServiceResult<Goal> {
        let input = NewGoal::new(name, description);
        let goal = complete("goal_create", self.repo.create_goal(&input))?;
        info!(
            "event=goal_create module=service status=ok id={} display_order={}",
            goal.id, goal.display_order
        );
        self.notifier
            .publish(ChangeEvent::inserted(Collection::Goals, goal.id));
        Ok(goal)
    }

    /// Creates a goal plus its initial tasks as one unit.
    ///
    /// Nothing is stored when any task fails validation.
    pub fn create_goal_with_tasks(
        &self,
        name: impl Into<String>,
        description: Option<String>,
        tasks: Vec<NewTask>,
    ) -> ServiceResult<(Goal, Vec<Task>)> {
        let input = NewGoal::new(name, description);
        let tasks = tasks.into_iter().map(normalize_task).collect::<Vec<_>>();
        let (goal, created_tasks) = complete(
            "goal_create_with_tasks",
            self.repo.create_goal_with_tasks(&input, &tasks),
        )?;
        info!(
            "event=goal_create_with_tasks module=service status=ok id={} tasks={}",
            goal.id,
            created_tasks.len()
        );
        self.notifier
            .publish(ChangeEvent::inserted(Collection::Goals, goal.id));
        for task in &created_tasks {
            self.notifier
                .publish(ChangeEvent::inserted(Collection::Tasks, task.id));
        }
        Ok((goal, created_tasks))
    }

    pub fn get_goal(&self, id: EntityId) -> ServiceResult<Goal> {
        complete("goal_get", self.repo.get_goal(id))?
            .ok_or(ServiceError::NotFound { entity: "goal", id })
    }

    /// Goals in display order; empty on fetch failure.
    pub fn list_goals(&self) -> Vec<Goal> {
        fetch_or_empty("goal_list", self.repo.list_goals())
    }

    /// Sets or clears the goal description. Blank text clears it.
    pub fn set_goal_description(
        &self,
        id: EntityId,
        description: Option<String>,
    ) -> ServiceResult<()> {
        let description = normalize_optional(description);
        complete(
            "goal_set_description",
            self.repo.set_goal_description(id, description.as_deref()),
        )?;
        self.notifier
            .publish(ChangeEvent::updated(Collection::Goals, id));
        Ok(())
    }

    /// Deletes a goal and all of its tasks in one commit.
    ///
    /// Returns the number of tasks removed.
    pub fn delete_goal(&self, id: EntityId) -> ServiceResult<usize> {
        let task_ids = complete("goal_delete", self.repo.list_tasks(id))?
            .into_iter()
            .map(|task| task.id)
            .collect::<Vec<_>>();
        let removed = complete("goal_delete", self.repo.delete_goal(id))?;
        info!("event=goal_delete module=service status=ok id={id} tasks={removed}");

        for task_id in task_ids {
            self.notifier
                .publish(ChangeEvent::deleted(Collection::Tasks, task_id));
        }
        self.notifier
            .publish(ChangeEvent::deleted(Collection::Goals, id));
        Ok(removed)
    }

    /// Creates a task under `goal_id`, numbered after that goal's last task.
    pub fn create_task(&self, goal_id: EntityId, task: NewTask) -> ServiceResult<Task> {
        let task = normalize_task(task);
        let created = complete("task_create", self.repo.create_task(goal_id, &task))?;
        info!(
            "event=task_create module=service status=ok id={} goal_id={goal_id} display_order={}",
            created.id, created.display_order
        );
        self.notifier
            .publish(ChangeEvent::inserted(Collection::Tasks, created.id));
        Ok(created)
    }

    pub fn get_task(&self, id: EntityId) -> ServiceResult<Task> {
        complete("task_get", self.repo.get_task(id))?
            .ok_or(ServiceError::NotFound { entity: "task", id })
    }

    /// Tasks of one goal in display order; empty on fetch failure.
    pub fn list_tasks(&self, goal_id: EntityId) -> Vec<Task> {
        fetch_or_empty("task_list", self.repo.list_tasks(goal_id))
    }

    pub fn set_task_completed(&self, id: EntityId, completed: bool) -> ServiceResult<()> {
        complete(
            "task_set_completed",
            self.repo.set_task_completed(id, completed),
        )?;
        self.notifier
            .publish(ChangeEvent::updated(Collection::Tasks, id));
        Ok(())
    }

    /// Flips completion and returns the new state.
    pub fn toggle_task_completed(&self, id: EntityId) -> ServiceResult<bool> {
        let task = self.get_task(id)?;
        let completed = !task.is_completed;
        self.set_task_completed(id, completed)?;
        Ok(completed)
    }

    pub fn delete_task(&self, id: EntityId) -> ServiceResult<()> {
        complete("task_delete", self.repo.delete_task(id))?;
        info!("event=task_delete module=service status=ok id={id}");
        self.notifier
            .publish(ChangeEvent::deleted(Collection::Tasks, id));
        Ok(())
    }

    pub fn goal_progress(&self, goal_id: EntityId) -> ServiceResult<GoalProgress> {
        complete("goal_progress", self.repo.goal_progress(goal_id))
    }
}

fn normalize_task(task: NewTask) -> NewTask {
    NewTask {
        text: task.text.trim().to_string(),
        ..task
    }
}
