//! Goal repository

use std::cmp::Ordering;
use std::rc::Rc;

use super::{
    compare_optional, compare_titles, contains_term, fetch, include_all, CachePatcher, CachedList,
    Comparator, ListRequest, NamedQuery, QueryPage, Record, SharedQueryCache,
};
use crate::core::events::{Change, DomainEvent, Subscription};
use crate::core::identity::EntityId;
use crate::core::store::{Store, StoreError};
use crate::entities::Goal;

/// Every goal
pub const ALL_GOALS: NamedQuery<Goal> = NamedQuery {
    name: "AllGoals",
    includes: include_all::<Goal>,
    default_order: by_title,
};

fn by_title(a: &Goal, b: &Goal) -> Ordering {
    compare_titles(&a.title, &b.title)
}

fn by_status(a: &Goal, b: &Goal) -> Ordering {
    a.status
        .description()
        .cmp(b.status.description())
        .then_with(|| by_title(a, b))
}

fn by_created(a: &Goal, b: &Goal) -> Ordering {
    a.created.cmp(&b.created).then_with(|| by_title(a, b))
}

fn by_category(a: &Goal, b: &Goal) -> Ordering {
    compare_optional(&a.category, &b.category).then_with(|| by_title(a, b))
}

fn by_target(a: &Goal, b: &Goal) -> Ordering {
    compare_optional(&a.target_date, &b.target_date).then_with(|| by_title(a, b))
}

impl Record for Goal {
    fn matches_term(&self, term: &str) -> bool {
        contains_term(
            &[
                &self.title,
                &self.description,
                self.category.as_deref().unwrap_or(""),
            ],
            term,
        )
    }

    fn comparator(column: &str) -> Option<Comparator<Self>> {
        match column {
            "title" => Some(by_title),
            "status" => Some(by_status),
            "created" => Some(by_created),
            "category" => Some(by_category),
            "target" | "target_date" => Some(by_target),
            _ => None,
        }
    }

    fn into_list(records: Vec<Self>) -> CachedList {
        CachedList::Goals(records)
    }

    fn from_list(list: &CachedList) -> Option<&Vec<Self>> {
        match list {
            CachedList::Goals(goals) => Some(goals),
            _ => None,
        }
    }

    fn change(event: &DomainEvent) -> Option<&Change<Self>> {
        match event {
            DomainEvent::Goal(change) => Some(change),
            _ => None,
        }
    }
}

/// Goal access with a cached "AllGoals" query
pub struct GoalRepository {
    store: Rc<Store>,
    cache: SharedQueryCache,
    _subscription: Subscription,
}

impl GoalRepository {
    pub fn new(store: Rc<Store>, cache: SharedQueryCache) -> Self {
        let patcher = CachePatcher::new(Rc::clone(&cache), vec![ALL_GOALS]);
        let subscription = store.events().subscribe(Rc::new(patcher));
        Self {
            store,
            cache,
            _subscription: subscription,
        }
    }

    pub fn list(&self, request: &ListRequest) -> Result<QueryPage<Goal>, StoreError> {
        fetch(&self.cache, &ALL_GOALS, request, || self.store.all_goals())
    }

    pub fn get(&self, id: &EntityId) -> Result<Option<Goal>, StoreError> {
        self.store.get_goal(id)
    }

    pub fn resolve(&self, query: &str) -> Result<Goal, StoreError> {
        self.store.resolve_goal(query)
    }

    pub fn add(&self, goal: Goal) -> Result<Goal, StoreError> {
        self.store.insert_goal(&goal)?;
        Ok(goal)
    }

    pub fn update(&self, goal: &Goal) -> Result<(), StoreError> {
        self.store.update_goal(goal)
    }

    pub fn delete(&self, id: &EntityId) -> Result<(), StoreError> {
        self.store.delete_goal(id)
    }
}
