//! Project persistence

use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{id_column, optional_id_column, parsed_column, Store, StoreError};
use crate::core::events::{Change, DomainEvent};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::Project;

const PROJECT_COLUMNS: &str = "id, goal_id, title, description, status, due_date, created, author";

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: id_column(row, 0)?,
        goal_id: optional_id_column(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: parsed_column(row, 4)?,
        due_date: row.get(5)?,
        created: row.get(6)?,
        author: row.get(7)?,
    })
}

impl Store {
    pub fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO projects ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                PROJECT_COLUMNS
            ),
            params![
                project.id.to_string(),
                project.goal_id.as_ref().map(|id| id.to_string()),
                project.title,
                project.description,
                project.status.to_string(),
                project.due_date,
                project.created,
                project.author,
            ],
        )?;
        debug!(id = %project.id, "project inserted");
        self.publish(DomainEvent::Project(Change::Added(project.clone())))
    }

    pub fn update_project(&self, project: &Project) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE projects SET goal_id = ?2, title = ?3, description = ?4, status = ?5,
                due_date = ?6 WHERE id = ?1",
            params![
                project.id.to_string(),
                project.goal_id.as_ref().map(|id| id.to_string()),
                project.title,
                project.description,
                project.status.to_string(),
                project.due_date,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "project",
                query: project.id.to_string(),
            });
        }
        debug!(id = %project.id, "project updated");
        self.publish(DomainEvent::Project(Change::Updated(project.clone())))
    }

    /// Delete a project; fails while tasks still point at it
    pub fn delete_project(&self, id: &EntityId) -> Result<(), StoreError> {
        let tasks = self.count_where("SELECT COUNT(*) FROM tasks WHERE project_id = ?1", id)?;
        if tasks > 0 {
            return Err(StoreError::HasDependents {
                kind: "project",
                id: id.to_string(),
                count: tasks,
                dependents: "task(s)",
            });
        }

        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: "project",
                query: id.to_string(),
            });
        }
        debug!(%id, "project deleted");
        self.publish(DomainEvent::Project(Change::Deleted(id.clone())))
    }

    pub fn get_project(&self, id: &EntityId) -> Result<Option<Project>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS),
                params![id.to_string()],
                project_from_row,
            )
            .optional()?)
    }

    pub fn all_projects(&self) -> Result<Vec<Project>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM projects", PROJECT_COLUMNS))?;
        let projects = stmt
            .query_map([], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = projects.len(), "loaded projects");
        Ok(projects)
    }

    pub fn resolve_project(&self, query: &str) -> Result<Project, StoreError> {
        let id = self.resolve_id("projects", EntityPrefix::Proj, query)?;
        self.get_project(&id)?.ok_or_else(|| StoreError::NotFound {
            kind: "project",
            query: query.to_string(),
        })
    }
}
