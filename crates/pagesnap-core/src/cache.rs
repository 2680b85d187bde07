//! Cache invalidation port and an in-memory tag cache
//!
//! Cache entries are tagged with key/value pairs (`page_id => 42`).
//! Invalidating a set of keys drops every entry whose tags contain all of
//! them.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::errors::{PageSnapError, Result};
use crate::model::PageId;

/// Tag set identifying cache entries
pub type CacheKeys = BTreeMap<String, String>;

/// Tag for every cached artifact of a page
pub fn page_keys(page_id: PageId) -> CacheKeys {
    let mut keys = CacheKeys::new();
    keys.insert("page_id".to_string(), page_id.to_string());
    keys
}

pub trait CacheManager {
    /// Drop every cached entry tagged with all of `keys`
    fn invalidate(&self, keys: &CacheKeys) -> Result<()>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    tags: CacheKeys,
    value: String,
}

/// Thread-safe in-memory cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<BTreeMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(
        &self,
        key: impl Into<String>,
        tags: CacheKeys,
        value: impl Into<String>,
    ) -> Result<()> {
        let mut entries = self.lock()?;
        entries.insert(
            key.into(),
            CacheEntry {
                tags,
                value: value.into(),
            },
        );
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).map(|e| e.value.clone()))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, CacheEntry>>> {
        self.entries.lock().map_err(|_| PageSnapError::CacheInvalidation {
            message: "cache lock poisoned".to_string(),
        })
    }
}

impl CacheManager for MemoryCache {
    fn invalidate(&self, keys: &CacheKeys) -> Result<()> {
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, entry| {
            !keys
                .iter()
                .all(|(k, v)| entry.tags.get(k).map_or(false, |tag| tag == v))
        });
        tracing::debug!(
            keys = ?keys,
            removed = before - entries.len(),
            "cache invalidated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_by_page_tag() {
        let cache = MemoryCache::new();
        cache.put("page-1-body", page_keys(1), "<p>one</p>").unwrap();
        cache.put("page-2-body", page_keys(2), "<p>two</p>").unwrap();

        cache.invalidate(&page_keys(1)).unwrap();

        assert_eq!(cache.get("page-1-body").unwrap(), None);
        assert_eq!(cache.get("page-2-body").unwrap().as_deref(), Some("<p>two</p>"));
    }

    #[test]
    fn test_invalidate_requires_all_keys() {
        let cache = MemoryCache::new();
        let mut tags = page_keys(1);
        tags.insert("block_id".to_string(), "5".to_string());
        cache.put("block", tags, "x").unwrap();

        let mut other_block = page_keys(1);
        other_block.insert("block_id".to_string(), "6".to_string());
        cache.invalidate(&other_block).unwrap();
        assert_eq!(cache.len().unwrap(), 1);

        cache.invalidate(&page_keys(1)).unwrap();
        assert!(cache.is_empty().unwrap());
    }
}
