//! Cache-backed repositories
//!
//! Each repository answers "all records of type X" queries from the shared
//! [`QueryCache`], falling back to a full store scan on a miss. Paging is a
//! slice over the cached list and never reaches the store. Every repository
//! subscribes a [`CachePatcher`] to the store's events so cached lists follow
//! adds, updates and deletes without being re-queried.

mod goals;
mod projects;
mod tasks;

pub use goals::GoalRepository;
pub use projects::ProjectRepository;
pub use tasks::TaskRepository;

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use tracing::debug;

use crate::core::entity::Entity;
use crate::core::events::{Change, DomainEvent, EventHandler};
use crate::core::query_cache::{CacheError, QueryCache};
use crate::core::store::StoreError;
use crate::entities::{Goal, Project, Task};

/// Value type stored in the shared query cache
#[derive(Debug, Clone, PartialEq)]
pub enum CachedList {
    Goals(Vec<Goal>),
    Projects(Vec<Project>),
    Tasks(Vec<Task>),
}

impl CachedList {
    pub fn len(&self) -> usize {
        match self {
            CachedList::Goals(v) => v.len(),
            CachedList::Projects(v) => v.len(),
            CachedList::Tasks(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The cache instance shared by every repository of a [`Tracker`](crate::core::Tracker)
pub type SharedQueryCache = Rc<RefCell<QueryCache<CachedList>>>;

pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// A cacheable query: its cache name, membership test and default ordering
pub struct NamedQuery<T> {
    pub name: &'static str,
    pub includes: fn(&T) -> bool,
    pub default_order: Comparator<T>,
}

impl<T> Clone for NamedQuery<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NamedQuery<T> {}

/// A record type that can live in the query cache
pub trait Record: Entity + Clone + 'static {
    /// Case-insensitive substring match; the empty term matches everything
    fn matches_term(&self, term: &str) -> bool;

    /// Comparison for a symbolic sort column, `None` if unrecognized
    fn comparator(column: &str) -> Option<Comparator<Self>>;

    fn into_list(records: Vec<Self>) -> CachedList;

    fn from_list(list: &CachedList) -> Option<&Vec<Self>>;

    /// The change carried by `event`, if it concerns this record type
    fn change(event: &DomainEvent) -> Option<&Change<Self>>;
}

/// A 1-based page of `size` records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    pub fn new(number: usize, size: usize) -> Self {
        Self { number, size }
    }

    /// Records `size * (number - 1) ..` up to `size` of them
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let skip = self.size.saturating_mul(self.number.saturating_sub(1));
        if skip >= items.len() {
            return &[];
        }
        let end = skip.saturating_add(self.size).min(items.len());
        &items[skip..end]
    }

    /// Number of pages needed for `total` records
    pub fn page_count(&self, total: usize) -> usize {
        if self.size == 0 {
            return 0;
        }
        total.div_ceil(self.size)
    }
}

/// Parameters of a list query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub filter_term: String,
    pub sort: Option<String>,
    pub page: Option<Page>,
}

impl ListRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filtered(mut self, term: impl Into<String>) -> Self {
        self.filter_term = term.into();
        self
    }

    pub fn sorted_by(mut self, column: impl Into<String>) -> Self {
        self.sort = Some(column.into());
        self
    }

    pub fn paged(mut self, number: usize, size: usize) -> Self {
        self.page = Some(Page::new(number, size));
        self
    }

    fn term(&self) -> &str {
        self.filter_term.trim()
    }

    fn sort_column(&self) -> Option<String> {
        self.sort
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }
}

/// One page of a query result plus the size of the whole result
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: Option<Page>,
}

/// Order `records` by `column`, or by the query's default when the column
/// is absent or unknown
pub fn sort_records<T: Record>(records: &mut [T], column: Option<&str>, query: &NamedQuery<T>) {
    let compare = column
        .and_then(T::comparator)
        .unwrap_or(query.default_order);
    records.sort_by(compare);
}

fn qualifies<T: Record>(query: &NamedQuery<T>, record: &T, term: &str) -> bool {
    (query.includes)(record) && record.matches_term(term)
}

/// Answer `request` for `query`, from the cache when possible
pub(crate) fn fetch<T, F>(
    cache: &SharedQueryCache,
    query: &NamedQuery<T>,
    request: &ListRequest,
    load: F,
) -> Result<QueryPage<T>, StoreError>
where
    T: Record,
    F: FnOnce() -> Result<Vec<T>, StoreError>,
{
    let term = request.term();
    let sort = request.sort_column();

    let cached = {
        let cache = cache.borrow();
        cache.get_cache_item(query.name, term).and_then(|entry| {
            T::from_list(entry.value()).map(|_| entry.sort_column().map(str::to_string))
        })
    };

    match cached {
        Some(stored_sort) => {
            debug!(query = query.name, term, "query cache hit");
            let mut cache = cache.borrow_mut();
            cache.record_hit();
            if stored_sort != sort {
                let mut records = cache
                    .get_cache_item(query.name, term)
                    .and_then(|entry| T::from_list(entry.value()))
                    .cloned()
                    .unwrap_or_default();
                sort_records(&mut records, sort.as_deref(), query);
                cache.update_cache_item(query.name, term, sort, T::into_list(records))?;
            }
        }
        None => {
            debug!(query = query.name, term, "query cache miss");
            cache.borrow_mut().record_miss();
            let mut records: Vec<T> = load()?
                .into_iter()
                .filter(|r| qualifies(query, r, term))
                .collect();
            sort_records(&mut records, sort.as_deref(), query);
            cache
                .borrow_mut()
                .add_cache_item(query.name, term, sort, T::into_list(records));
        }
    }

    let cache = cache.borrow();
    let records = cache
        .get_cache_item(query.name, term)
        .and_then(|entry| T::from_list(entry.value()))
        .ok_or_else(|| CacheError::EntryNotFound {
            name: query.name.to_string(),
            filter_term: term.to_string(),
        })?;

    let items = match request.page {
        Some(page) => page.slice(records).to_vec(),
        None => records.clone(),
    };

    Ok(QueryPage {
        items,
        total: records.len(),
        page: request.page,
    })
}

/// Event handler that patches the cached lists of a set of queries
pub struct CachePatcher<T> {
    cache: SharedQueryCache,
    queries: Vec<NamedQuery<T>>,
}

impl<T: Record> CachePatcher<T> {
    pub fn new(cache: SharedQueryCache, queries: Vec<NamedQuery<T>>) -> Self {
        Self { cache, queries }
    }

    fn patch(&self, query: &NamedQuery<T>, change: &Change<T>) -> Result<(), CacheError> {
        let mut cache = self.cache.borrow_mut();

        // Every filter variant of the query is kept in step, not just the first.
        for term in cache.filter_terms(query.name) {
            let Some(entry) = cache.get_cache_item(query.name, &term) else {
                continue;
            };
            let Some(current) = T::from_list(entry.value()) else {
                continue;
            };
            let sort = entry.sort_column().map(str::to_string);
            let mut records = current.clone();

            if !apply_change(&mut records, change, query, &term, sort.as_deref()) {
                continue;
            }

            debug!(query = query.name, term = %term, action = change.action(), "patching cached list");
            cache.update_cache_item(query.name, &term, sort, T::into_list(records))?;
            cache.record_patch();
        }
        Ok(())
    }
}

impl<T: Record> EventHandler for CachePatcher<T> {
    fn handle(&self, event: &DomainEvent) -> Result<(), CacheError> {
        let Some(change) = T::change(event) else {
            return Ok(());
        };
        for query in &self.queries {
            self.patch(query, change)?;
        }
        Ok(())
    }
}

/// Apply one change to a cached list; returns whether the list changed
fn apply_change<T: Record>(
    records: &mut Vec<T>,
    change: &Change<T>,
    query: &NamedQuery<T>,
    term: &str,
    sort: Option<&str>,
) -> bool {
    match change {
        Change::Added(record) | Change::Updated(record) => {
            let pos = records.iter().position(|r| r.id() == record.id());
            if qualifies(query, record, term) {
                match pos {
                    Some(i) => records[i] = record.clone(),
                    None => records.push(record.clone()),
                }
                sort_records(records, sort, query);
                true
            } else if let Some(i) = pos {
                records.remove(i);
                true
            } else {
                false
            }
        }
        Change::Deleted(id) => {
            let before = records.len();
            records.retain(|r| r.id() != id);
            records.len() != before
        }
    }
}

/// Case-insensitive title ordering
pub(crate) fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Orders `Some` before `None`
pub(crate) fn compare_optional<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub(crate) fn contains_term(haystacks: &[&str], term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    haystacks.iter().any(|h| h.to_lowercase().contains(&term))
}

pub(crate) fn include_all<T>(_: &T) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_slice() {
        let items: Vec<u32> = (1..=7).collect();

        assert_eq!(Page::new(1, 3).slice(&items), &[1, 2, 3]);
        assert_eq!(Page::new(3, 3).slice(&items), &[7]);
        assert!(Page::new(4, 3).slice(&items).is_empty());
        assert_eq!(Page::new(3, 3).page_count(items.len()), 3);
    }

    #[test]
    fn test_page_zero_reads_as_first_page() {
        let items = [1, 2, 3];
        assert_eq!(Page::new(0, 2).slice(&items), &[1, 2]);
    }

    #[test]
    fn test_list_request_normalizes_sort() {
        let request = ListRequest::all().sorted_by("  Title ");
        assert_eq!(request.sort_column().as_deref(), Some("title"));
        assert_eq!(ListRequest::all().sorted_by("").sort_column(), None);
    }

    #[test]
    fn test_contains_term() {
        assert!(contains_term(&["Buy milk"], ""));
        assert!(contains_term(&["Buy milk", ""], "MILK"));
        assert!(!contains_term(&["Buy milk"], "bread"));
    }

    #[test]
    fn test_compare_optional_puts_none_last() {
        assert_eq!(compare_optional(&Some(1), &None), Ordering::Less);
        assert_eq!(compare_optional::<u8>(&None, &None), Ordering::Equal);
        assert_eq!(compare_optional(&Some(2), &Some(1)), Ordering::Greater);
    }
}
