//! Entity trait - common interface for all entity types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::EntityId;

/// Common trait for all tracked entities
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity type prefix (e.g., "GOAL", "TASK")
    const PREFIX: &'static str;

    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// Get the entity's title
    fn title(&self) -> &str;

    /// Get the entity's status
    fn status(&self) -> Status;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Get the author
    fn author(&self) -> &str;
}

/// Progress status shared by goals, projects and tasks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    OnHold,
    Completed,
    Abandoned,
}

impl Status {
    /// Display description, also the key used when sorting by status
    pub fn description(&self) -> &'static str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::OnHold => "On Hold",
            Status::Completed => "Completed",
            Status::Abandoned => "Abandoned",
        }
    }

    /// Anything not finished one way or the other
    pub fn is_active(&self) -> bool {
        !matches!(self, Status::Completed | Status::Abandoned)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::NotStarted => write!(f, "not_started"),
            Status::InProgress => write!(f, "in_progress"),
            Status::OnHold => write!(f, "on_hold"),
            Status::Completed => write!(f, "completed"),
            Status::Abandoned => write!(f, "abandoned"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "not_started" | "new" => Ok(Status::NotStarted),
            "in_progress" | "started" => Ok(Status::InProgress),
            "on_hold" | "waiting" => Ok(Status::OnHold),
            "completed" | "done" => Ok(Status::Completed),
            "abandoned" => Ok(Status::Abandoned),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// Priority values for tasks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_aliases() {
        assert_eq!("done".parse::<Status>().unwrap(), Status::Completed);
        assert_eq!("In Progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("on-hold".parse::<Status>().unwrap(), Status::OnHold);
        assert!("finished-ish".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_display_roundtrips() {
        for status in [
            Status::NotStarted,
            Status::InProgress,
            Status::OnHold,
            Status::Completed,
            Status::Abandoned,
        ] {
            assert_eq!(status.to_string().parse::<Status>().unwrap(), status);
        }
    }

    #[test]
    fn test_active_statuses() {
        assert!(Status::NotStarted.is_active());
        assert!(Status::OnHold.is_active());
        assert!(!Status::Completed.is_active());
        assert!(!Status::Abandoned.is_active());
    }
}
