//! Goal entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Status};
use crate::core::identity::{EntityId, EntityPrefix};

/// A long-lived objective that projects work towards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier
    pub id: EntityId,

    /// Short title
    pub title: String,

    /// Longer description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Category (user-defined, e.g. "health", "career")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Current status
    #[serde(default)]
    pub status: Status,

    /// Date the goal should be reached by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this goal)
    pub author: String,
}

impl Entity for Goal {
    const PREFIX: &'static str = "GOAL";

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

impl Goal {
    /// Create a new goal with the given title
    pub fn new(title: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Goal),
            title,
            description: String::new(),
            category: None,
            status: Status::default(),
            target_date: None,
            created: Utc::now(),
            author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_serializes_status_snake_case() {
        let mut goal = Goal::new("Run a marathon".to_string(), "test".to_string());
        goal.status = Status::InProgress;

        let yaml = serde_yml::to_string(&goal).unwrap();
        assert!(yaml.contains("status: in_progress"));
        assert!(!yaml.contains("description"));
    }
}
