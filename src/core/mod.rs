//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod events;
pub mod identity;
pub mod query_cache;
pub mod repository;
pub mod store;
pub mod tracker;
pub mod workspace;

pub use config::Config;
pub use entity::{Entity, Priority, Status};
pub use events::{Change, DomainEvent, EventBus, EventHandler, Subscription};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use query_cache::{CacheEntry, CacheError, CacheStats, QueryCache};
pub use repository::{CachedList, ListRequest, Page, QueryPage};
pub use store::{Store, StoreError};
pub use tracker::Tracker;
pub use workspace::{Workspace, WorkspaceError};
