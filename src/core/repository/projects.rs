//! Project repository

use std::cmp::Ordering;
use std::rc::Rc;

use super::{
    compare_optional, compare_titles, contains_term, fetch, include_all, CachePatcher, CachedList,
    Comparator, ListRequest, NamedQuery, QueryPage, Record, SharedQueryCache,
};
use crate::core::events::{Change, DomainEvent, Subscription};
use crate::core::identity::EntityId;
use crate::core::store::{Store, StoreError};
use crate::entities::Project;

/// Every project
pub const ALL_PROJECTS: NamedQuery<Project> = NamedQuery {
    name: "AllProjects",
    includes: include_all::<Project>,
    default_order: by_title,
};

fn by_title(a: &Project, b: &Project) -> Ordering {
    compare_titles(&a.title, &b.title)
}

fn by_status(a: &Project, b: &Project) -> Ordering {
    a.status
        .description()
        .cmp(b.status.description())
        .then_with(|| by_title(a, b))
}

fn by_created(a: &Project, b: &Project) -> Ordering {
    a.created.cmp(&b.created).then_with(|| by_title(a, b))
}

fn by_due(a: &Project, b: &Project) -> Ordering {
    compare_optional(&a.due_date, &b.due_date).then_with(|| by_title(a, b))
}

impl Record for Project {
    fn matches_term(&self, term: &str) -> bool {
        contains_term(&[&self.title, &self.description], term)
    }

    fn comparator(column: &str) -> Option<Comparator<Self>> {
        match column {
            "title" => Some(by_title),
            "status" => Some(by_status),
            "created" => Some(by_created),
            "due" | "due_date" => Some(by_due),
            _ => None,
        }
    }

    fn into_list(records: Vec<Self>) -> CachedList {
        CachedList::Projects(records)
    }

    fn from_list(list: &CachedList) -> Option<&Vec<Self>> {
        match list {
            CachedList::Projects(projects) => Some(projects),
            _ => None,
        }
    }

    fn change(event: &DomainEvent) -> Option<&Change<Self>> {
        match event {
            DomainEvent::Project(change) => Some(change),
            _ => None,
        }
    }
}

/// Project access with a cached "AllProjects" query
pub struct ProjectRepository {
    store: Rc<Store>,
    cache: SharedQueryCache,
    _subscription: Subscription,
}

impl ProjectRepository {
    pub fn new(store: Rc<Store>, cache: SharedQueryCache) -> Self {
        let patcher = CachePatcher::new(Rc::clone(&cache), vec![ALL_PROJECTS]);
        let subscription = store.events().subscribe(Rc::new(patcher));
        Self {
            store,
            cache,
            _subscription: subscription,
        }
    }

    pub fn list(&self, request: &ListRequest) -> Result<QueryPage<Project>, StoreError> {
        fetch(&self.cache, &ALL_PROJECTS, request, || {
            self.store.all_projects()
        })
    }

    /// Projects attached to `goal_id`, read through the cached full list
    pub fn for_goal(&self, goal_id: &EntityId) -> Result<Vec<Project>, StoreError> {
        let all = self.list(&ListRequest::all())?;
        Ok(all
            .items
            .into_iter()
            .filter(|p| p.goal_id.as_ref() == Some(goal_id))
            .collect())
    }

    pub fn get(&self, id: &EntityId) -> Result<Option<Project>, StoreError> {
        self.store.get_project(id)
    }

    pub fn resolve(&self, query: &str) -> Result<Project, StoreError> {
        self.store.resolve_project(query)
    }

    pub fn add(&self, project: Project) -> Result<Project, StoreError> {
        self.store.insert_project(&project)?;
        Ok(project)
    }

    pub fn update(&self, project: &Project) -> Result<(), StoreError> {
        self.store.update_project(project)
    }

    pub fn delete(&self, id: &EntityId) -> Result<(), StoreError> {
        self.store.delete_project(id)
    }
}
