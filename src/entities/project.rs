//! Project entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Status};
use crate::core::identity::{EntityId, EntityPrefix};

/// A body of work, optionally in service of a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: EntityId,

    /// Goal this project contributes to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<EntityId>,

    /// Short title
    pub title: String,

    /// Longer description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Current status
    #[serde(default)]
    pub status: Status,

    /// Due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this project)
    pub author: String,
}

impl Entity for Project {
    const PREFIX: &'static str = "PROJ";

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

impl Project {
    /// Create a new project with the given title
    pub fn new(title: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Proj),
            goal_id: None,
            title,
            description: String::new(),
            status: Status::default(),
            due_date: None,
            created: Utc::now(),
            author,
        }
    }
}
