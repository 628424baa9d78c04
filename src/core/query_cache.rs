//! In-memory query-result cache
//!
//! Memoizes the materialized result of a named query, scoped by a filter
//! term, so that paging and re-sorting do not go back to the store. Entries
//! are keyed by `(name, filter_term)` and patched in place by the
//! repositories when domain events arrive.
//!
//! The registry does no eviction and has no size bound: the number of
//! entries is the number of distinct (query, filter) pairs used in a
//! session. Lookups are a linear scan with first-match semantics.

use thiserror::Error;
use tracing::{debug, trace};

/// One memoized query result
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    name: String,
    filter_term: String,
    sort_column: Option<String>,
    value: V,
}

impl<V> CacheEntry<V> {
    /// Logical query name (e.g. "AllTasks")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filter term this entry is scoped to; empty means unfiltered
    pub fn filter_term(&self) -> &str {
        &self.filter_term
    }

    /// Sort column last applied to `value`, `None` for default ordering
    pub fn sort_column(&self) -> Option<&str> {
        self.sort_column.as_deref()
    }

    /// The materialized result
    pub fn value(&self) -> &V {
        &self.value
    }

    fn has_key(&self, name: &str, filter_term: &str) -> bool {
        self.name == name && self.filter_term == filter_term
    }
}

/// Hit/miss/patch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub patches: u64,
}

/// Errors raised by the query cache
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache item '{name}' (filter '{filter_term}') not found")]
    EntryNotFound { name: String, filter_term: String },
}

/// Registry of named, filter-scoped query results
#[derive(Debug)]
pub struct QueryCache<V> {
    entries: Vec<CacheEntry<V>>,
    stats: CacheStats,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> QueryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            stats: CacheStats::default(),
        }
    }

    /// Store a result, replacing any entry with the same `(name, filter_term)`
    pub fn add_cache_item(
        &mut self,
        name: &str,
        filter_term: &str,
        sort_column: Option<String>,
        value: V,
    ) {
        if let Some(pos) = self.position(name, filter_term) {
            self.entries.remove(pos);
            debug!(name, filter_term, "replacing cache item");
        } else {
            debug!(name, filter_term, "adding cache item");
        }

        self.entries.push(CacheEntry {
            name: name.to_string(),
            filter_term: filter_term.to_string(),
            sort_column,
            value,
        });
    }

    /// Remove the first entry named `name`, whatever its filter term
    ///
    /// When several filter variants share a name, which one goes depends on
    /// insertion order. Returns the removed entry, if any.
    pub fn remove_cache_item(&mut self, name: &str) -> Option<CacheEntry<V>> {
        let pos = self.entries.iter().position(|e| e.name == name)?;
        debug!(name, "removing cache item");
        Some(self.entries.remove(pos))
    }

    /// Replace the value and sort column of an existing entry
    pub fn update_cache_item(
        &mut self,
        name: &str,
        filter_term: &str,
        sort_column: Option<String>,
        value: V,
    ) -> Result<(), CacheError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.has_key(name, filter_term))
            .ok_or_else(|| CacheError::EntryNotFound {
                name: name.to_string(),
                filter_term: filter_term.to_string(),
            })?;

        trace!(name, filter_term, sort = ?sort_column, "updating cache item");
        entry.sort_column = sort_column;
        entry.value = value;
        Ok(())
    }

    /// Entry matching both name and filter term
    pub fn get_cache_item(&self, name: &str, filter_term: &str) -> Option<&CacheEntry<V>> {
        self.entries.iter().find(|e| e.has_key(name, filter_term))
    }

    /// First entry with this name, ignoring the filter term
    pub fn get_cache_item_by_name(&self, name: &str) -> Option<&CacheEntry<V>> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Filter terms of every entry named `name`, in insertion order
    pub fn filter_terms(&self, name: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.name == name)
            .map(|e| e.filter_term.clone())
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry<V>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry; counters are kept
    pub fn clear(&mut self) {
        debug!(count = self.entries.len(), "clearing query cache");
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn record_hit(&mut self) {
        self.stats.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.stats.misses += 1;
    }

    pub fn record_patch(&mut self) {
        self.stats.patches += 1;
    }

    fn position(&self, name: &str, filter_term: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.has_key(name, filter_term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> QueryCache<Vec<&'static str>> {
        QueryCache::new()
    }

    #[test]
    fn test_add_then_get_returns_value_and_sort() {
        let mut cache = cache();
        cache.add_cache_item("AllTasks", "", Some("title".into()), vec!["a", "b"]);

        let entry = cache.get_cache_item("AllTasks", "").unwrap();
        assert_eq!(entry.value(), &vec!["a", "b"]);
        assert_eq!(entry.sort_column(), Some("title"));
        assert_eq!(entry.name(), "AllTasks");
        assert_eq!(entry.filter_term(), "");
    }

    #[test]
    fn test_add_twice_overwrites_single_entry() {
        let mut cache = cache();
        cache.add_cache_item("AllGoals", "run", None, vec!["first"]);
        cache.add_cache_item("AllGoals", "run", Some("status".into()), vec!["second"]);

        assert_eq!(cache.len(), 1);
        let entry = cache.get_cache_item("AllGoals", "run").unwrap();
        assert_eq!(entry.value(), &vec!["second"]);
        assert_eq!(entry.sort_column(), Some("status"));
    }

    #[test]
    fn test_update_missing_key_fails() {
        let mut cache = cache();
        cache.add_cache_item("AllGoals", "", None, vec![]);

        let err = cache
            .update_cache_item("AllGoals", "other", None, vec!["x"])
            .unwrap_err();
        assert_eq!(
            err,
            CacheError::EntryNotFound {
                name: "AllGoals".to_string(),
                filter_term: "other".to_string(),
            }
        );
        assert!(err.to_string().contains("AllGoals"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_update_present_key_keeps_identity() {
        let mut cache = cache();
        cache.add_cache_item("ActiveTasks", "mail", None, vec!["a"]);
        cache
            .update_cache_item("ActiveTasks", "mail", Some("due".into()), vec!["b", "c"])
            .unwrap();

        let entry = cache.get_cache_item("ActiveTasks", "mail").unwrap();
        assert_eq!(entry.name(), "ActiveTasks");
        assert_eq!(entry.filter_term(), "mail");
        assert_eq!(entry.sort_column(), Some("due"));
        assert_eq!(entry.value(), &vec!["b", "c"]);
    }

    #[test]
    fn test_get_with_other_filter_is_miss() {
        let mut cache = cache();
        cache.add_cache_item("AllTasks", "home", None, vec!["a"]);

        assert!(cache.get_cache_item("AllTasks", "work").is_none());
        assert!(cache.get_cache_item("AllTasks", "").is_none());
    }

    #[test]
    fn test_get_by_name_ignores_filter() {
        let mut cache = cache();
        cache.add_cache_item("AllTasks", "home", None, vec!["h"]);
        cache.add_cache_item("AllTasks", "work", None, vec!["w"]);

        let entry = cache.get_cache_item_by_name("AllTasks").unwrap();
        assert_eq!(entry.filter_term(), "home");
        assert!(cache.get_cache_item_by_name("AllGoals").is_none());
    }

    #[test]
    fn test_remove_takes_first_by_name_only() {
        let mut cache = cache();
        cache.add_cache_item("AllTasks", "home", None, vec!["h"]);
        cache.add_cache_item("AllTasks", "work", None, vec!["w"]);

        let removed = cache.remove_cache_item("AllTasks").unwrap();
        assert_eq!(removed.filter_term(), "home");
        assert!(cache.get_cache_item("AllTasks", "work").is_some());
        assert_eq!(cache.filter_terms("AllTasks"), vec!["work".to_string()]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cache = cache();
        assert!(cache.remove_cache_item("Nothing").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_keeps_stats() {
        let mut cache = cache();
        cache.add_cache_item("AllGoals", "", None, vec![]);
        cache.record_hit();
        cache.record_miss();
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                patches: 0
            }
        );
    }
}
