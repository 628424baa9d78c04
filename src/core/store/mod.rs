//! SQLite-backed store for goals, projects and tasks
//!
//! This is the system of record. Every successful write publishes a
//! [`DomainEvent`] on the injected [`EventBus`] before returning, so that
//! subscribed query caches are patched synchronously.
//!
//! Schema migration is not supported: opening a database written with a
//! different schema version is an error.

mod goals;
mod projects;
mod schema;
mod tasks;

use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use thiserror::Error;
use tracing::debug;

use crate::core::events::{DomainEvent, EventBus};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::query_cache::CacheError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Errors raised by the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("database schema version {found} does not match expected version {expected}; migration is not supported")]
    SchemaMismatch { found: i32, expected: i32 },

    #[error("no {kind} found matching '{query}'")]
    NotFound { kind: &'static str, query: String },

    #[error("'{query}' matches {count} {kind}s; use a longer id")]
    Ambiguous {
        kind: &'static str,
        query: String,
        count: usize,
    },

    #[error("{kind} {id} still has {count} {dependents}; delete or move them first")]
    HasDependents {
        kind: &'static str,
        id: String,
        count: usize,
        dependents: &'static str,
    },
}

/// The entity store backed by SQLite
pub struct Store {
    conn: Connection,
    events: Rc<EventBus>,
}

impl Store {
    /// Open or create the database at `path`
    pub fn open(path: &Path, events: Rc<EventBus>) -> Result<Self, StoreError> {
        debug!(path = %path.display(), "opening store");
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn, events)
    }

    /// Open a private in-memory database
    pub fn open_in_memory(events: Rc<EventBus>) -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, events)
    }

    fn init(conn: Connection, events: Rc<EventBus>) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let store = Self { conn, events };
        store.init_schema()?;
        Ok(store)
    }

    /// The bus this store publishes on
    pub fn events(&self) -> &Rc<EventBus> {
        &self.events
    }

    fn publish(&self, event: DomainEvent) -> Result<(), StoreError> {
        self.events.publish(&event)?;
        Ok(())
    }

    /// Resolve a full id or unique id prefix to an id stored in `table`
    ///
    /// The type prefix may be omitted ("01HQ3" is read as "TASK-01HQ3").
    /// The query is compared literally; a bare type prefix matches nothing.
    fn resolve_id(
        &self,
        table: &str,
        prefix: EntityPrefix,
        query: &str,
    ) -> Result<EntityId, StoreError> {
        let query = query.trim().to_uppercase();
        let (type_part, ulid_part) = query
            .split_once('-')
            .unwrap_or((prefix.as_str(), query.as_str()));
        if ulid_part.is_empty() {
            return Err(StoreError::NotFound {
                kind: prefix.noun(),
                query,
            });
        }
        let pattern = format!("{}-{}", type_part, ulid_part);

        let sql = format!(
            "SELECT id FROM {} WHERE substr(id, 1, length(?1)) = ?1 LIMIT 2",
            table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut ids = stmt
            .query_map(params![pattern], |row| id_column(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        match ids.len() {
            0 => Err(StoreError::NotFound {
                kind: prefix.noun(),
                query,
            }),
            1 => Ok(ids.remove(0)),
            _ => {
                let count: usize = self.conn.query_row(
                    &format!(
                        "SELECT COUNT(*) FROM {} WHERE substr(id, 1, length(?1)) = ?1",
                        table
                    ),
                    params![pattern],
                    |row| row.get(0),
                )?;
                Err(StoreError::Ambiguous {
                    kind: prefix.noun(),
                    query,
                    count,
                })
            }
        }
    }

    fn count_where(&self, sql: &str, id: &EntityId) -> Result<usize, StoreError> {
        Ok(self
            .conn
            .query_row(sql, params![id.to_string()], |row| row.get(0))?)
    }
}

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

/// Read a text column through `FromStr`
fn parsed_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e: T::Err| conversion_error(idx, e.to_string()))
}

fn id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<EntityId> {
    parsed_column(row, idx)
}

fn optional_id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<EntityId>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        s.parse::<EntityId>()
            .map_err(|e| conversion_error(idx, e.to_string()))
    })
    .transpose()
}
