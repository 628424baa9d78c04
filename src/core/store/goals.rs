//! Goal persistence

use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{id_column, parsed_column, Store, StoreError};
use crate::core::events::{Change, DomainEvent};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::Goal;

const GOAL_COLUMNS: &str =
    "id, title, description, category, status, target_date, created, author";

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: id_column(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        status: parsed_column(row, 4)?,
        target_date: row.get(5)?,
        created: row.get(6)?,
        author: row.get(7)?,
    })
}

impl Store {
    pub fn insert_goal(&self, goal: &Goal) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO goals ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                GOAL_COLUMNS
            ),
            params![
                goal.id.to_string(),
                goal.title,
                goal.description,
                goal.category,
                goal.status.to_string(),
                goal.target_date,
                goal.created,
                goal.author,
            ],
        )?;
        debug!(id = %goal.id, "goal inserted");
        self.publish(DomainEvent::Goal(Change::Added(goal.clone())))
    }

    pub fn update_goal(&self, goal: &Goal) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE goals SET title = ?2, description = ?3, category = ?4, status = ?5,
                target_date = ?6 WHERE id = ?1",
            params![
                goal.id.to_string(),
                goal.title,
                goal.description,
                goal.category,
                goal.status.to_string(),
                goal.target_date,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "goal",
                query: goal.id.to_string(),
            });
        }
        debug!(id = %goal.id, "goal updated");
        self.publish(DomainEvent::Goal(Change::Updated(goal.clone())))
    }

    /// Delete a goal; fails while projects still point at it
    pub fn delete_goal(&self, id: &EntityId) -> Result<(), StoreError> {
        let projects = self.count_where("SELECT COUNT(*) FROM projects WHERE goal_id = ?1", id)?;
        if projects > 0 {
            return Err(StoreError::HasDependents {
                kind: "goal",
                id: id.to_string(),
                count: projects,
                dependents: "project(s)",
            });
        }

        let changed = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "goal",
                query: id.to_string(),
            });
        }
        debug!(%id, "goal deleted");
        self.publish(DomainEvent::Goal(Change::Deleted(id.clone())))
    }

    pub fn get_goal(&self, id: &EntityId) -> Result<Option<Goal>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {} FROM goals WHERE id = ?1", GOAL_COLUMNS),
                params![id.to_string()],
                goal_from_row,
            )
            .optional()?)
    }

    /// Every goal, in no particular order
    pub fn all_goals(&self) -> Result<Vec<Goal>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM goals", GOAL_COLUMNS))?;
        let goals = stmt
            .query_map([], goal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = goals.len(), "loaded goals");
        Ok(goals)
    }

    /// Find a goal by full id or unique id prefix
    pub fn resolve_goal(&self, query: &str) -> Result<Goal, StoreError> {
        let id = self.resolve_id("goals", EntityPrefix::Goal, query)?;
        self.get_goal(&id)?.ok_or_else(|| StoreError::NotFound {
            kind: "goal",
            query: query.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::entity::Status;
    use crate::core::events::{EventBus, EventHandler};
    use crate::core::query_cache::CacheError;
    use crate::entities::Project;

    struct Collect(RefCell<Vec<DomainEvent>>);

    impl EventHandler for Collect {
        fn handle(&self, event: &DomainEvent) -> Result<(), CacheError> {
            self.0.borrow_mut().push(event.clone());
            Ok(())
        }
    }

    #[test]
    fn test_goal_crud_publishes_events() {
        let bus = EventBus::new();
        let collect = Rc::new(Collect(RefCell::new(Vec::new())));
        let _sub = bus.subscribe(collect.clone());
        let store = Store::open_in_memory(bus).unwrap();

        let mut goal = Goal::new("Learn Rust".to_string(), "test".to_string());
        goal.category = Some("career".to_string());
        store.insert_goal(&goal).unwrap();

        goal.status = Status::InProgress;
        store.update_goal(&goal).unwrap();
        assert_eq!(store.get_goal(&goal.id).unwrap().unwrap(), goal);

        store.delete_goal(&goal.id).unwrap();
        assert!(store.get_goal(&goal.id).unwrap().is_none());

        let events = collect.0.borrow();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], DomainEvent::Goal(Change::Added(g)) if g.id == goal.id));
        assert!(matches!(&events[1], DomainEvent::Goal(Change::Updated(g)) if g.status == Status::InProgress));
        assert!(matches!(&events[2], DomainEvent::Goal(Change::Deleted(id)) if *id == goal.id));
    }

    #[test]
    fn test_delete_goal_with_projects_is_refused() {
        let store = Store::open_in_memory(EventBus::new()).unwrap();
        let goal = Goal::new("Ship it".to_string(), "test".to_string());
        store.insert_goal(&goal).unwrap();

        let mut project = Project::new("Beta".to_string(), "test".to_string());
        project.goal_id = Some(goal.id.clone());
        store.insert_project(&project).unwrap();

        let err = store.delete_goal(&goal.id).unwrap_err();
        assert!(matches!(err, StoreError::HasDependents { count: 1, .. }));
    }

    #[test]
    fn test_resolve_goal_by_prefix() {
        let store = Store::open_in_memory(EventBus::new()).unwrap();
        let goal = Goal::new("Read more".to_string(), "test".to_string());
        store.insert_goal(&goal).unwrap();

        let full = goal.id.to_string();
        assert_eq!(store.resolve_goal(&full).unwrap().id, goal.id);
        assert_eq!(store.resolve_goal(&full[..12]).unwrap().id, goal.id);
        assert_eq!(
            store.resolve_goal(&goal.id.ulid().to_string()[..6]).unwrap().id,
            goal.id
        );
        assert!(matches!(
            store.resolve_goal("GOAL-ZZZZ").unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn test_update_missing_goal_is_not_found() {
        let store = Store::open_in_memory(EventBus::new()).unwrap();
        let goal = Goal::new("Ghost".to_string(), "test".to_string());
        assert!(matches!(
            store.update_goal(&goal).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }
}
