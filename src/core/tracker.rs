//! Composition root: one store, one event bus, one query cache

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::core::events::EventBus;
use crate::core::query_cache::QueryCache;
use crate::core::repository::{
    CachedList, GoalRepository, ProjectRepository, SharedQueryCache, TaskRepository,
};
use crate::core::store::{Store, StoreError};
use crate::core::Workspace;

/// Everything a command needs to read and write tracked records
///
/// The repositories share a single [`QueryCache`] which lives as long as
/// the tracker. Dropping the tracker unsubscribes every cache patcher.
pub struct Tracker {
    store: Rc<Store>,
    cache: SharedQueryCache,
    pub goals: GoalRepository,
    pub projects: ProjectRepository,
    pub tasks: TaskRepository,
}

impl Tracker {
    pub fn new(store: Store) -> Self {
        let store = Rc::new(store);
        let cache: SharedQueryCache = Rc::new(RefCell::new(QueryCache::new()));

        Self {
            goals: GoalRepository::new(Rc::clone(&store), Rc::clone(&cache)),
            projects: ProjectRepository::new(Rc::clone(&store), Rc::clone(&cache)),
            tasks: TaskRepository::new(Rc::clone(&store), Rc::clone(&cache)),
            store,
            cache,
        }
    }

    /// Open the workspace database
    pub fn open(workspace: &Workspace) -> Result<Self, StoreError> {
        let store = Store::open(&workspace.db_path(), EventBus::new())?;
        Ok(Self::new(store))
    }

    /// A tracker over a private in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(Store::open_in_memory(EventBus::new())?))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn cache(&self) -> Ref<'_, QueryCache<CachedList>> {
        self.cache.borrow()
    }

    /// Forget every cached result; the next list of each kind goes to the store
    pub fn clear_cache(&self) {
        debug!("clearing query cache on request");
        self.cache.borrow_mut().clear();
    }
}
