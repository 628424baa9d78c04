//! Task repository

use std::cmp::Ordering;
use std::rc::Rc;

use super::{
    compare_optional, compare_titles, contains_term, fetch, include_all, CachePatcher, CachedList,
    Comparator, ListRequest, NamedQuery, QueryPage, Record, SharedQueryCache,
};
use crate::core::events::{Change, DomainEvent, Subscription};
use crate::core::identity::EntityId;
use crate::core::store::{Store, StoreError};
use crate::entities::Task;

/// Every task
pub const ALL_TASKS: NamedQuery<Task> = NamedQuery {
    name: "AllTasks",
    includes: include_all::<Task>,
    default_order: by_title,
};

/// Tasks that are neither completed nor abandoned, in their explicit order
pub const ACTIVE_TASKS: NamedQuery<Task> = NamedQuery {
    name: "ActiveTasks",
    includes: is_active,
    default_order: by_sort_order,
};

fn is_active(task: &Task) -> bool {
    task.status.is_active()
}

fn by_title(a: &Task, b: &Task) -> Ordering {
    compare_titles(&a.title, &b.title)
}

fn by_sort_order(a: &Task, b: &Task) -> Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| by_title(a, b))
}

fn by_status(a: &Task, b: &Task) -> Ordering {
    a.status
        .description()
        .cmp(b.status.description())
        .then_with(|| by_title(a, b))
}

fn by_created(a: &Task, b: &Task) -> Ordering {
    a.created.cmp(&b.created).then_with(|| by_title(a, b))
}

// Most urgent first.
fn by_priority(a: &Task, b: &Task) -> Ordering {
    b.priority.cmp(&a.priority).then_with(|| by_title(a, b))
}

fn by_due(a: &Task, b: &Task) -> Ordering {
    compare_optional(&a.due_date, &b.due_date).then_with(|| by_title(a, b))
}

impl Record for Task {
    fn matches_term(&self, term: &str) -> bool {
        contains_term(&[&self.title, &self.notes], term)
    }

    fn comparator(column: &str) -> Option<Comparator<Self>> {
        match column {
            "title" => Some(by_title),
            "status" => Some(by_status),
            "created" => Some(by_created),
            "priority" => Some(by_priority),
            "due" | "due_date" => Some(by_due),
            "order" | "sort_order" => Some(by_sort_order),
            _ => None,
        }
    }

    fn into_list(records: Vec<Self>) -> CachedList {
        CachedList::Tasks(records)
    }

    fn from_list(list: &CachedList) -> Option<&Vec<Self>> {
        match list {
            CachedList::Tasks(tasks) => Some(tasks),
            _ => None,
        }
    }

    fn change(event: &DomainEvent) -> Option<&Change<Self>> {
        match event {
            DomainEvent::Task(change) => Some(change),
            _ => None,
        }
    }
}

/// Task access with cached "AllTasks" and "ActiveTasks" queries
pub struct TaskRepository {
    store: Rc<Store>,
    cache: SharedQueryCache,
    _subscription: Subscription,
}

impl TaskRepository {
    pub fn new(store: Rc<Store>, cache: SharedQueryCache) -> Self {
        let patcher = CachePatcher::new(Rc::clone(&cache), vec![ALL_TASKS, ACTIVE_TASKS]);
        let subscription = store.events().subscribe(Rc::new(patcher));
        Self {
            store,
            cache,
            _subscription: subscription,
        }
    }

    pub fn list(&self, request: &ListRequest) -> Result<QueryPage<Task>, StoreError> {
        fetch(&self.cache, &ALL_TASKS, request, || self.store.all_tasks())
    }

    pub fn list_active(&self, request: &ListRequest) -> Result<QueryPage<Task>, StoreError> {
        fetch(&self.cache, &ACTIVE_TASKS, request, || self.store.all_tasks())
    }

    pub fn get(&self, id: &EntityId) -> Result<Option<Task>, StoreError> {
        self.store.get_task(id)
    }

    pub fn resolve(&self, query: &str) -> Result<Task, StoreError> {
        self.store.resolve_task(query)
    }

    /// Store a new task; a zero `sort_order` puts it at the end of the list
    pub fn add(&self, mut task: Task) -> Result<Task, StoreError> {
        if task.sort_order == 0 {
            task.sort_order = self.store.next_sort_order()?;
        }
        self.store.insert_task(&task)?;
        Ok(task)
    }

    pub fn update(&self, task: &Task) -> Result<(), StoreError> {
        self.store.update_task(task)
    }

    pub fn delete(&self, id: &EntityId) -> Result<(), StoreError> {
        self.store.delete_task(id)
    }

    pub fn complete(&self, id: &EntityId) -> Result<Task, StoreError> {
        let mut task = self.require(id)?;
        task.mark_completed();
        self.store.update_task(&task)?;
        Ok(task)
    }

    /// Move a task to a new position in the active ordering
    pub fn reorder(&self, id: &EntityId, sort_order: i64) -> Result<Task, StoreError> {
        let mut task = self.require(id)?;
        task.sort_order = sort_order;
        self.store.update_task(&task)?;
        Ok(task)
    }

    fn require(&self, id: &EntityId) -> Result<Task, StoreError> {
        self.store.get_task(id)?.ok_or_else(|| StoreError::NotFound {
            kind: "task",
            query: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query_cache::CacheStats;
    use crate::core::Tracker;

    fn task(title: &str) -> Task {
        Task::new(title.to_string(), "test".to_string())
    }

    fn cached_titles(tracker: &Tracker, name: &str, term: &str) -> Vec<String> {
        let cache = tracker.cache();
        let entry = cache.get_cache_item(name, term).expect("cache entry");
        match entry.value() {
            CachedList::Tasks(tasks) => tasks.iter().map(|t| t.title.clone()).collect(),
            other => panic!("unexpected cached list {:?}", other),
        }
    }

    #[test]
    fn test_add_and_delete_events_patch_cached_list() {
        let tracker = Tracker::in_memory().unwrap();
        let _t1 = tracker.tasks.add(task("T1")).unwrap();
        let t2 = tracker.tasks.add(task("T2")).unwrap();

        let first = tracker.tasks.list(&ListRequest::all()).unwrap();
        assert_eq!(first.total, 2);
        assert_eq!(cached_titles(&tracker, "AllTasks", ""), vec!["T1", "T2"]);

        tracker.tasks.add(task("T3")).unwrap();
        assert_eq!(
            cached_titles(&tracker, "AllTasks", ""),
            vec!["T1", "T2", "T3"]
        );

        tracker.tasks.delete(&t2.id).unwrap();
        assert_eq!(cached_titles(&tracker, "AllTasks", ""), vec!["T1", "T3"]);

        let again = tracker.tasks.list(&ListRequest::all()).unwrap();
        let titles: Vec<_> = again.items.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["T1", "T3"]);
        assert_eq!(
            tracker.cache().stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                patches: 2
            }
        );
    }

    #[test]
    fn test_patch_sorts_by_stored_column() {
        let tracker = Tracker::in_memory().unwrap();
        tracker.tasks.add(task("b")).unwrap();
        tracker.tasks.add(task("a")).unwrap();
        tracker.tasks.list(&ListRequest::all()).unwrap();

        // Added last, but "0" sorts before letters by title
        tracker.tasks.add(task("0 urgent")).unwrap();
        assert_eq!(
            cached_titles(&tracker, "AllTasks", ""),
            vec!["0 urgent", "a", "b"]
        );
    }

    #[test]
    fn test_filtered_entries_only_take_matching_records() {
        let tracker = Tracker::in_memory().unwrap();
        tracker.tasks.add(task("Check mail")).unwrap();
        tracker
            .tasks
            .list(&ListRequest::all().filtered("mail"))
            .unwrap();

        tracker.tasks.add(task("Buy milk")).unwrap();
        tracker.tasks.add(task("Answer Email")).unwrap();

        assert_eq!(
            cached_titles(&tracker, "AllTasks", "mail"),
            vec!["Answer Email", "Check mail"]
        );
    }

    #[test]
    fn test_every_filter_variant_is_patched() {
        let tracker = Tracker::in_memory().unwrap();
        tracker.tasks.list(&ListRequest::all()).unwrap();
        tracker
            .tasks
            .list(&ListRequest::all().filtered("mail"))
            .unwrap();

        tracker.tasks.add(task("Post mail")).unwrap();

        assert_eq!(cached_titles(&tracker, "AllTasks", ""), vec!["Post mail"]);
        assert_eq!(
            cached_titles(&tracker, "AllTasks", "mail"),
            vec!["Post mail"]
        );
    }

    #[test]
    fn test_completing_task_leaves_active_list() {
        let tracker = Tracker::in_memory().unwrap();
        let wash = tracker.tasks.add(task("Wash car")).unwrap();
        tracker.tasks.add(task("Mow lawn")).unwrap();

        let active = tracker.tasks.list_active(&ListRequest::all()).unwrap();
        assert_eq!(active.total, 2);

        tracker.tasks.complete(&wash.id).unwrap();

        assert_eq!(cached_titles(&tracker, "ActiveTasks", ""), vec!["Mow lawn"]);
        let active = tracker.tasks.list_active(&ListRequest::all()).unwrap();
        assert_eq!(active.total, 1);
    }

    #[test]
    fn test_active_tasks_default_to_sort_order() {
        let tracker = Tracker::in_memory().unwrap();
        let first = tracker.tasks.add(task("zzz first")).unwrap();
        tracker.tasks.add(task("aaa second")).unwrap();

        let active = tracker.tasks.list_active(&ListRequest::all()).unwrap();
        let titles: Vec<_> = active.items.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["zzz first", "aaa second"]);

        tracker.tasks.reorder(&first.id, 10).unwrap();
        assert_eq!(
            cached_titles(&tracker, "ActiveTasks", ""),
            vec!["aaa second", "zzz first"]
        );
    }

    #[test]
    fn test_resort_on_hit_updates_stored_sort_column() {
        let tracker = Tracker::in_memory().unwrap();
        let mut low = task("alpha");
        low.priority = crate::core::entity::Priority::Low;
        let mut high = task("beta");
        high.priority = crate::core::entity::Priority::Critical;
        tracker.tasks.add(low).unwrap();
        tracker.tasks.add(high).unwrap();

        tracker.tasks.list(&ListRequest::all()).unwrap();
        let by_priority = tracker
            .tasks
            .list(&ListRequest::all().sorted_by("priority"))
            .unwrap();

        let titles: Vec<_> = by_priority.items.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["beta", "alpha"]);
        let cache = tracker.cache();
        let entry = cache.get_cache_item("AllTasks", "").unwrap();
        assert_eq!(entry.sort_column(), Some("priority"));
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_paging_slices_cached_result() {
        let tracker = Tracker::in_memory().unwrap();
        for title in ["a", "b", "c", "d", "e"] {
            tracker.tasks.add(task(title)).unwrap();
        }

        let page = tracker
            .tasks
            .list(&ListRequest::all().paged(2, 2))
            .unwrap();
        let titles: Vec<_> = page.items.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "d"]);
        assert_eq!(page.total, 5);

        let last = tracker
            .tasks
            .list(&ListRequest::all().paged(3, 2))
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(tracker.cache().stats().misses, 1);
    }

    #[test]
    fn test_delete_of_uncached_task_is_not_a_patch() {
        let tracker = Tracker::in_memory().unwrap();
        let wash = tracker.tasks.add(task("Wash car")).unwrap();
        let mow = tracker.tasks.add(task("Mow lawn")).unwrap();
        tracker.tasks.complete(&wash.id).unwrap();

        tracker.tasks.list_active(&ListRequest::all()).unwrap();
        let before = tracker.cache().stats().patches;

        // Completed tasks are not in ActiveTasks, so nothing changes.
        tracker.tasks.delete(&wash.id).unwrap();

        assert_eq!(tracker.cache().stats().patches, before);
        assert_eq!(cached_titles(&tracker, "ActiveTasks", ""), vec!["Mow lawn"]);
        assert!(tracker.tasks.get(&mow.id).unwrap().is_some());
    }
}

