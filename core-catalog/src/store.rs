//! Content Cache handle
//!
//! The authoritative in-memory catalog. A `ContentStore` is a cheap,
//! cloneable handle; every component that reads or writes the cache gets a
//! clone at construction time. Readers receive snapshots (clones) and must
//! not assume the content is unchanged between two reads.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{CatalogItem, Category, ContentCache};

#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    inner: Arc<RwLock<ContentCache>>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(cache: ContentCache) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cache)),
        }
    }

    // A panic while holding the lock leaves a whole, valid cache behind
    fn read(&self) -> RwLockReadGuard<'_, ContentCache> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContentCache> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Clone of the current content
    pub fn snapshot(&self) -> ContentCache {
        self.read().clone()
    }

    /// Replace the whole cache
    pub fn replace(&self, cache: ContentCache) {
        *self.write() = cache;
    }

    /// Look up one entry by category and identifier
    pub fn get_item(&self, category: Category, id: &str) -> Option<CatalogItem> {
        self.read().find(category, id)
    }

    pub fn contains(&self, category: Category, id: &str) -> bool {
        self.read().contains(category, id)
    }

    /// (films, series)
    pub fn counts(&self) -> (usize, usize) {
        let cache = self.read();
        (cache.films.len(), cache.series.len())
    }

    /// Mutate in place and return the resulting snapshot.
    pub fn update<F, R>(&self, f: F) -> (R, ContentCache)
    where
        F: FnOnce(&mut ContentCache) -> R,
    {
        let mut cache = self.write();
        let result = f(&mut cache);
        (result, cache.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentItem;

    #[test]
    fn test_clones_share_content() {
        let store = ContentStore::new();
        let other = store.clone();

        store.replace(ContentCache::new(vec![ContentItem::new("1", "A")], Vec::new()));

        assert_eq!(other.counts(), (1, 0));
        assert!(other.get_item(Category::Film, "1").is_some());
        assert!(other.get_item(Category::Serie, "1").is_none());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = ContentStore::new();
        let mut snapshot = store.snapshot();
        snapshot.films.push(ContentItem::new("x", "X"));

        assert_eq!(store.counts(), (0, 0));
    }

    #[test]
    fn test_update_returns_new_snapshot() {
        let store = ContentStore::with_content(ContentCache::new(
            vec![ContentItem::new("1", "A"), ContentItem::new("2", "B")],
            Vec::new(),
        ));

        let (removed, after) = store.update(|cache| cache.remove(Category::Film, "1"));
        assert_eq!(removed, 1);
        assert_eq!(after.films.len(), 1);
        assert_eq!(store.snapshot(), after);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let store = ContentStore::new();
        let clone = store.clone();

        let _ = std::thread::spawn(move || {
            clone.update(|cache| {
                cache.films.push(ContentItem::new("1", "A"));
                panic!("writer panicked");
            })
        })
        .join();

        assert_eq!(store.counts(), (1, 0));
    }
}
