//! Process-wide ambient configuration (`spec.md` §6).
//!
//! Every knob here has a sensible default; callers override only what they
//! need via the builder. A `VfsConfig` is attached to an FS instance at
//! construction time (see [`crate::open`]) and consulted by the Async Core,
//! the read-buffer strategies, and the directory-listing cache.

use std::time::Duration;

use crate::async_core::{DEFAULT_GATHER_BATCH_SIZE, DEFAULT_NOFILES_GATHER_BATCH_SIZE};
use crate::buffer::BufferStrategy;

/// Ambient configuration shared by an FS instance and its layers.
#[derive(Debug, Clone, PartialEq)]
pub struct VfsConfig {
    /// Max concurrent network coroutines per bulk call.
    pub gather_batch_size: usize,
    /// Same, for operations that open local file descriptors.
    pub nofiles_gather_batch_size: usize,
    /// TTL for the directory-listing cache; `None` means entries never expire.
    pub listings_expiry_time: Option<Duration>,
    /// Whether the directory-listing cache is consulted at all.
    pub use_listings_cache: bool,
    /// Skip the Instance Cache when building a new FS for a URL.
    pub skip_instance_cache: bool,
    /// Implicitly create missing parent directories during copy/put.
    pub auto_mkdir: bool,
    /// Construct the FS in async-native mode (primitives invoked directly,
    /// no sync-bridge).
    pub asynchronous: bool,
    /// Default read-buffer strategy for `open`/Buffered File.
    pub cache_type: BufferStrategy,
    /// Block size in bytes used by block-oriented cache strategies.
    pub block_size: u64,
    /// Max number of blocks held by block-oriented cache strategies.
    pub max_blocks: usize,
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            gather_batch_size: DEFAULT_GATHER_BATCH_SIZE,
            nofiles_gather_batch_size: DEFAULT_NOFILES_GATHER_BATCH_SIZE,
            listings_expiry_time: None,
            use_listings_cache: true,
            skip_instance_cache: false,
            auto_mkdir: false,
            asynchronous: false,
            cache_type: BufferStrategy::default(),
            block_size: crate::buffer::DEFAULT_BLOCK_SIZE,
            max_blocks: crate::buffer::DEFAULT_MAX_BLOCKS,
        }
    }
}

impl VfsConfig {
    /// Start from the defaults.
    pub fn builder() -> VfsConfigBuilder {
        VfsConfigBuilder(VfsConfig::default())
    }
}

/// Fluent builder for [`VfsConfig`]; every setter returns `Self`.
#[derive(Debug, Clone, Default)]
pub struct VfsConfigBuilder(VfsConfig);

impl VfsConfigBuilder {
    /// Set [`VfsConfig::gather_batch_size`].
    pub fn gather_batch_size(mut self, n: usize) -> Self {
        self.0.gather_batch_size = n;
        self
    }

    /// Set [`VfsConfig::nofiles_gather_batch_size`].
    pub fn nofiles_gather_batch_size(mut self, n: usize) -> Self {
        self.0.nofiles_gather_batch_size = n;
        self
    }

    /// Set [`VfsConfig::listings_expiry_time`].
    pub fn listings_expiry_time(mut self, ttl: Option<Duration>) -> Self {
        self.0.listings_expiry_time = ttl;
        self
    }

    /// Set [`VfsConfig::use_listings_cache`].
    pub fn use_listings_cache(mut self, enabled: bool) -> Self {
        self.0.use_listings_cache = enabled;
        self
    }

    /// Set [`VfsConfig::skip_instance_cache`].
    pub fn skip_instance_cache(mut self, skip: bool) -> Self {
        self.0.skip_instance_cache = skip;
        self
    }

    /// Set [`VfsConfig::auto_mkdir`].
    pub fn auto_mkdir(mut self, enabled: bool) -> Self {
        self.0.auto_mkdir = enabled;
        self
    }

    /// Set [`VfsConfig::asynchronous`].
    pub fn asynchronous(mut self, enabled: bool) -> Self {
        self.0.asynchronous = enabled;
        self
    }

    /// Set [`VfsConfig::cache_type`].
    pub fn cache_type(mut self, strategy: BufferStrategy) -> Self {
        self.0.cache_type = strategy;
        self
    }

    /// Set [`VfsConfig::block_size`].
    pub fn block_size(mut self, size: u64) -> Self {
        self.0.block_size = size;
        self
    }

    /// Set [`VfsConfig::max_blocks`].
    pub fn max_blocks(mut self, n: usize) -> Self {
        self.0.max_blocks = n;
        self
    }

    /// Finish building.
    pub fn build(self) -> VfsConfig {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = VfsConfig::default();
        assert_eq!(cfg.gather_batch_size, DEFAULT_GATHER_BATCH_SIZE);
        assert!(cfg.use_listings_cache);
        assert!(!cfg.skip_instance_cache);
        assert!(!cfg.auto_mkdir);
    }

    #[test]
    fn builder_overrides_only_what_is_set() {
        let cfg = VfsConfig::builder()
            .auto_mkdir(true)
            .block_size(1024)
            .build();
        assert!(cfg.auto_mkdir);
        assert_eq!(cfg.block_size, 1024);
        assert_eq!(cfg.gather_batch_size, DEFAULT_GATHER_BATCH_SIZE);
    }
}
