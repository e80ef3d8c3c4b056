//! # Directory-Listing Cache
//!
//! A TTL- and capacity-bounded cache from directory path to its listing,
//! built on `moka::sync::Cache` — the same crate `RMamonts-nfs-mamont`
//! reaches for to memoize repeated lookups behind a lock-free, sharded
//! map. Every write/remove on the owning FS must call [`invalidate`]
//! on the affected path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use moka::sync::Cache;

use crate::FileEntry;

/// Listing-cache configuration (`spec.md` §6: `listings_expiry_time`,
/// implicit max-entries policy).
#[derive(Debug, Clone)]
pub struct ListingCacheConfig {
    /// TTL for a cached listing. `None` means entries never expire by age.
    pub expiry: Option<Duration>,
    /// Maximum number of directories to retain. Least-recently-inserted
    /// entries are evicted once this is exceeded.
    pub max_paths: u64,
}

impl Default for ListingCacheConfig {
    fn default() -> Self {
        Self {
            expiry: None,
            max_paths: 10_000,
        }
    }
}

/// TTL + capacity-bounded directory-listing cache.
pub struct ListingCache {
    cache: Cache<PathBuf, Vec<FileEntry>>,
}

impl ListingCache {
    /// Build a cache from `config`.
    pub fn new(config: ListingCacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_paths);
        if let Some(ttl) = config.expiry {
            builder = builder.time_to_live(ttl);
        }
        Self {
            cache: builder.build(),
        }
    }

    /// Look up a cached listing, if present and unexpired.
    pub fn get(&self, path: &Path) -> Option<Vec<FileEntry>> {
        let hit = self.cache.get(path);
        if hit.is_some() {
            tracing::debug!(path = %path.display(), "listing cache hit");
        } else {
            tracing::debug!(path = %path.display(), "listing cache miss");
        }
        hit
    }

    /// Insert or replace the listing for `path`.
    pub fn put(&self, path: PathBuf, entries: Vec<FileEntry>) {
        self.cache.insert(path, entries);
    }

    /// Remove the cached listing for `path` and every ancestor directory —
    /// a write to a deeply nested path also invalidates each parent's
    /// cached listing, since that parent's entry set (or its metadata)
    /// may now be stale.
    pub fn invalidate(&self, path: &Path) {
        let mut current = Some(path);
        while let Some(p) = current {
            self.cache.invalidate(p);
            current = p.parent();
        }
    }

    /// Drop every cached listing.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Number of cached directories. Approximate under `moka`'s internal
    /// bookkeeping (entries pending eviction may still be counted).
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new(ListingCacheConfig::default())
    }
}
