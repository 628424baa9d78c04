//! Task entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Priority, Status};
use crate::core::identity::{EntityId, EntityPrefix};

/// A single unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: EntityId,

    /// Project this task belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<EntityId>,

    /// Short title
    pub title: String,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    /// Current status
    #[serde(default)]
    pub status: Status,

    /// Priority level
    #[serde(default)]
    pub priority: Priority,

    /// Position in the active task list (lower comes first)
    #[serde(default)]
    pub sort_order: i64,

    /// Due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// When the task was marked completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this task)
    pub author: String,
}

impl Entity for Task {
    const PREFIX: &'static str = "TASK";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> Status {
        self.status
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Task {
    /// Create a new task with the given title
    pub fn new(title: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Task),
            project_id: None,
            title,
            notes: String::new(),
            status: Status::default(),
            priority: Priority::default(),
            sort_order: 0,
            due_date: None,
            completed: None,
            created: Utc::now(),
            author,
        }
    }

    /// Mark the task completed, stamping the completion time once
    pub fn mark_completed(&mut self) {
        self.status = Status::Completed;
        if self.completed.is_none() {
            self.completed = Some(Utc::now());
        }
    }
}
