//! Goal and task entities.
//!
//! # Invariants
//! - A `Task` belongs to exactly one `Goal` through `goal_id`.
//! - Task `display_order` is scoped to its goal, not global.
//! - Task priority defaults to `Medium`.

use super::{normalize_optional, require_text, EntityId, ValidationError};
use serde::{Deserialize, Serialize};

/// Tracked goal ("triumph") owning zero or more tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    /// Epoch ms.
    pub date_created: i64,
    pub display_order: i32,
}

/// Task priority. Stored with its capitalized label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Parses a stored label; matching ignores ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Actionable step under a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub goal_id: EntityId,
    pub text: String,
    /// Epoch ms.
    pub due_date: Option<i64>,
    pub priority: TaskPriority,
    pub is_completed: bool,
    /// Epoch ms.
    pub date_created: i64,
    pub display_order: i32,
}

impl Task {
    /// True when a due date exists, is before `now_ms`, and the task is open.
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        !self.is_completed && self.due_date.is_some_and(|due| due < now_ms)
    }
}

/// Input for creating a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoal {
    pub name: String,
    pub description: Option<String>,
}

impl NewGoal {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            description: normalize_optional(description),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("goal name", &self.name)
    }
}

/// Input for creating a task under a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
    pub due_date: Option<i64>,
    pub priority: TaskPriority,
}

impl NewTask {
    /// Task with no due date and `Medium` priority.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            due_date: None,
            priority: TaskPriority::default(),
        }
    }

    pub fn with_due_date(mut self, due_date: i64) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("task text", &self.text)
    }
}

/// Completion summary for one goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub completed: u32,
    pub total: u32,
}

impl GoalProgress {
    /// Completed / total, or `0.0` for a goal without tasks.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.completed) / f64::from(self.total)
    }

    /// Rounded completion percentage in `0..=100`.
    pub fn percent(&self) -> u8 {
        (self.ratio() * 100.0).round() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}
