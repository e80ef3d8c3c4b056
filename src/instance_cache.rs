//! # Instance Cache
//!
//! Deduplicates filesystem instances keyed by `(protocol, stable_token)`,
//! where `stable_token` hashes the sorted, identity-relevant subset of a
//! construction's kwargs. Two `open`/`filesystem(...)` calls with equal
//! tokens return the same `Arc<dyn Fs>`.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::Fs;

/// Per-call kwargs that must never affect instance identity — buffering
/// knobs, callbacks, loop handles. Excluded before hashing so that two
/// calls differing only in, say, `block_size` still dedupe.
const NON_IDENTIFYING_KEYS: &[&str] = &[
    "block_size",
    "cache_type",
    "cache_options",
    "timeout",
    "callback",
    "skip_instance_cache",
];

/// Hash the sorted, identity-relevant kwargs into a stable token.
///
/// Stable across process runs (unlike `HashMap`'s default hasher), so the
/// same `(protocol, kwargs)` pair always produces the same key — required
/// for the cache to behave predictably across restarts in tests that
/// assert on cache population.
pub fn stable_token(kwargs: &HashMap<String, String>) -> String {
    let mut pairs: Vec<(&String, &String)> = kwargs
        .iter()
        .filter(|(k, _)| !NON_IDENTIFYING_KEYS.contains(&k.as_str()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    let mut hasher = blake3::Hasher::new();
    for (k, v) in pairs {
        hasher.update(k.as_bytes());
        hasher.update(b"\0");
        hasher.update(v.as_bytes());
        hasher.update(b"\0");
    }
    hasher.finalize().to_hex().to_string()
}

/// Process-wide cache of constructed filesystem instances.
///
/// Process-local only: forked children must call [`InstanceCache::reset`]
/// since inherited `Arc<dyn Fs>` backends may hold OS resources (sockets,
/// file descriptors) that do not survive a fork.
#[derive(Default)]
pub struct InstanceCache {
    instances: DashMap<(String, String), Arc<dyn Fs>>,
}

static GLOBAL: OnceLock<InstanceCache> = OnceLock::new();

impl InstanceCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide singleton instance cache used by [`crate::open`].
    pub fn global() -> &'static InstanceCache {
        GLOBAL.get_or_init(InstanceCache::default)
    }

    /// Return the cached instance for `(protocol, kwargs)`, constructing it
    /// with `build` on a miss. If `skip_instance_cache` is `true`, always
    /// constructs a fresh instance and never stores or reads the cache.
    pub fn get_or_build<F>(
        &self,
        protocol: &str,
        kwargs: &HashMap<String, String>,
        skip_instance_cache: bool,
        build: F,
    ) -> crate::VfsResult<Arc<dyn Fs>>
    where
        F: FnOnce() -> crate::VfsResult<Arc<dyn Fs>>,
    {
        if skip_instance_cache {
            tracing::debug!(protocol, "instance cache bypassed");
            return build();
        }

        let token = stable_token(kwargs);
        let key = (protocol.to_string(), token);

        if let Some(existing) = self.instances.get(&key) {
            tracing::debug!(protocol, "instance cache hit");
            return Ok(existing.clone());
        }

        tracing::debug!(protocol, "instance cache miss");
        let instance = build()?;
        self.instances.insert(key, instance.clone());
        Ok(instance)
    }

    /// Drop all cached instances. Used for fork-safety and test isolation.
    pub fn reset(&self) {
        self.instances.clear();
    }

    /// Number of live cached instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// `true` if no instances are cached.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryFs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn stable_token_ignores_non_identifying_keys() {
        let mut a = HashMap::new();
        a.insert("bucket".to_string(), "x".to_string());
        a.insert("block_size".to_string(), "4096".to_string());

        let mut b = HashMap::new();
        b.insert("bucket".to_string(), "x".to_string());
        b.insert("block_size".to_string(), "65536".to_string());

        assert_eq!(stable_token(&a), stable_token(&b));
    }

    #[test]
    fn stable_token_differs_on_identifying_keys() {
        let mut a = HashMap::new();
        a.insert("bucket".to_string(), "x".to_string());
        let mut b = HashMap::new();
        b.insert("bucket".to_string(), "y".to_string());
        assert_ne!(stable_token(&a), stable_token(&b));
    }

    #[test]
    fn stable_token_is_order_independent() {
        let mut a = HashMap::new();
        a.insert("z".to_string(), "1".to_string());
        a.insert("a".to_string(), "2".to_string());
        let mut b = HashMap::new();
        b.insert("a".to_string(), "2".to_string());
        b.insert("z".to_string(), "1".to_string());
        assert_eq!(stable_token(&a), stable_token(&b));
    }

    #[test]
    fn equal_tokens_return_same_instance() {
        let cache = InstanceCache::new();
        let kwargs = HashMap::new();
        let built = AtomicUsize::new(0);

        let a = cache
            .get_or_build("mem", &kwargs, false, || {
                built.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(MemoryFs::new()) as Arc<dyn Fs>)
            })
            .unwrap();
        let b = cache
            .get_or_build("mem", &kwargs, false, || {
                built.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(MemoryFs::new()) as Arc<dyn Fs>)
            })
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn skip_instance_cache_always_rebuilds() {
        let cache = InstanceCache::new();
        let kwargs = HashMap::new();
        let a = cache
            .get_or_build("mem", &kwargs, true, || {
                Ok(Arc::new(MemoryFs::new()) as Arc<dyn Fs>)
            })
            .unwrap();
        let b = cache
            .get_or_build("mem", &kwargs, true, || {
                Ok(Arc::new(MemoryFs::new()) as Arc<dyn Fs>)
            })
            .unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(cache.is_empty());
    }

    #[test]
    fn reset_clears_cache() {
        let cache = InstanceCache::new();
        let kwargs = HashMap::new();
        cache
            .get_or_build("mem", &kwargs, false, || {
                Ok(Arc::new(MemoryFs::new()) as Arc<dyn Fs>)
            })
            .unwrap();
        assert_eq!(cache.len(), 1);
        cache.reset();
        assert!(cache.is_empty());
    }
}
