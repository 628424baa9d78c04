//! Task persistence

use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{id_column, optional_id_column, parsed_column, Store, StoreError};
use crate::core::events::{Change, DomainEvent};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::Task;

const TASK_COLUMNS: &str = "id, project_id, title, notes, status, priority, sort_order, \
                            due_date, completed, created, author";

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: id_column(row, 0)?,
        project_id: optional_id_column(row, 1)?,
        title: row.get(2)?,
        notes: row.get(3)?,
        status: parsed_column(row, 4)?,
        priority: parsed_column(row, 5)?,
        sort_order: row.get(6)?,
        due_date: row.get(7)?,
        completed: row.get(8)?,
        created: row.get(9)?,
        author: row.get(10)?,
    })
}

impl Store {
    pub fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO tasks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                TASK_COLUMNS
            ),
            params![
                task.id.to_string(),
                task.project_id.as_ref().map(|id| id.to_string()),
                task.title,
                task.notes,
                task.status.to_string(),
                task.priority.to_string(),
                task.sort_order,
                task.due_date,
                task.completed,
                task.created,
                task.author,
            ],
        )?;
        debug!(id = %task.id, "task inserted");
        self.publish(DomainEvent::Task(Change::Added(task.clone())))
    }

    pub fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET project_id = ?2, title = ?3, notes = ?4, status = ?5, priority = ?6,
                sort_order = ?7, due_date = ?8, completed = ?9 WHERE id = ?1",
            params![
                task.id.to_string(),
                task.project_id.as_ref().map(|id| id.to_string()),
                task.title,
                task.notes,
                task.status.to_string(),
                task.priority.to_string(),
                task.sort_order,
                task.due_date,
                task.completed,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "task",
                query: task.id.to_string(),
            });
        }
        debug!(id = %task.id, "task updated");
        self.publish(DomainEvent::Task(Change::Updated(task.clone())))
    }

    pub fn delete_task(&self, id: &EntityId) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "task",
                query: id.to_string(),
            });
        }
        debug!(%id, "task deleted");
        self.publish(DomainEvent::Task(Change::Deleted(id.clone())))
    }

    pub fn get_task(&self, id: &EntityId) -> Result<Option<Task>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                params![id.to_string()],
                task_from_row,
            )
            .optional()?)
    }

    pub fn all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM tasks", TASK_COLUMNS))?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    pub fn resolve_task(&self, query: &str) -> Result<Task, StoreError> {
        let id = self.resolve_id("tasks", EntityPrefix::Task, query)?;
        self.get_task(&id)?.ok_or_else(|| StoreError::NotFound {
            kind: "task",
            query: query.to_string(),
        })
    }

    /// Sort position after every existing task
    pub fn next_sort_order(&self) -> Result<i64, StoreError> {
        let max: Option<i64> =
            self.conn
                .query_row("SELECT MAX(sort_order) FROM tasks", [], |row| row.get(0))?;
        Ok(max.map_or(1, |m| m + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::{Priority, Status};
    use crate::core::events::EventBus;

    #[test]
    fn test_task_roundtrip_preserves_fields() {
        let store = Store::open_in_memory(EventBus::new()).unwrap();
        let mut task = Task::new("File taxes".to_string(), "test".to_string());
        task.priority = Priority::High;
        task.notes = "Receipts in the blue folder".to_string();
        task.due_date = chrono::NaiveDate::from_ymd_opt(2027, 4, 15);
        task.sort_order = 7;
        store.insert_task(&task).unwrap();

        task.mark_completed();
        store.update_task(&task).unwrap();

        let loaded = store.get_task(&task.id).unwrap().unwrap();
        assert_eq!(loaded.status, Status::Completed);
        assert_eq!(loaded.priority, Priority::High);
        assert_eq!(loaded.sort_order, 7);
        assert_eq!(loaded.due_date, task.due_date);
        assert_eq!(loaded.completed, task.completed);
    }

    #[test]
    fn test_next_sort_order() {
        let store = Store::open_in_memory(EventBus::new()).unwrap();
        assert_eq!(store.next_sort_order().unwrap(), 1);

        let mut task = Task::new("One".to_string(), "test".to_string());
        task.sort_order = 4;
        store.insert_task(&task).unwrap();
        assert_eq!(store.next_sort_order().unwrap(), 5);
    }

    #[test]
    fn test_delete_missing_task_is_not_found() {
        let store = Store::open_in_memory(EventBus::new()).unwrap();
        let err = store
            .delete_task(&EntityId::new(EntityPrefix::Task))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "task", .. }));
    }

    #[test]
    fn test_resolve_treats_wildcards_literally() {
        let store = Store::open_in_memory(EventBus::new()).unwrap();
        let task = Task::new("only".to_string(), "test".to_string());
        store.insert_task(&task).unwrap();

        for query in ["_", "%", "TASK-", "TASK-%", "TASK-_", ""] {
            let err = store.resolve_task(query).unwrap_err();
            assert!(
                matches!(err, StoreError::NotFound { kind: "task", .. }),
                "{:?} resolved",
                query
            );
        }

        let ulid = task.id.ulid().to_string();
        assert_eq!(store.resolve_task(&ulid[..6]).unwrap().id, task.id);
        assert_eq!(
            store.resolve_task(&task.id.to_string().to_lowercase()).unwrap().id,
            task.id
        );
    }
}
