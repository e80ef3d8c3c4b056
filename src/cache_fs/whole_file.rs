//! Whole-file caching wrapper: the entire remote object is copied down on
//! first open and served locally thereafter.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache_fs::{cache_key, now_unix, to_fs_error, FreshnessPolicy, Manifest, ManifestEntry};
use crate::{Fs, FsDir, FsError, FsRead, FsWrite, Layer, ListingCache, Metadata, ReadDirIter};

/// Configuration consumed by [`WholeFileCacheLayer::layer`].
pub struct WholeFileCacheLayer {
    /// Where cached copies and the manifest live.
    pub cache_root: PathBuf,
    /// Backend the cache directory itself lives on (almost always a
    /// [`crate::backends::LocalFs`]).
    pub local: Arc<dyn Fs>,
    /// Staleness policy applied on every read.
    pub freshness: FreshnessPolicy,
    /// Optional listing cache to invalidate on writes through this layer.
    pub listing_cache: Option<Arc<ListingCache>>,
}

impl<B: Fs> Layer<B> for WholeFileCacheLayer {
    type Backend = WholeFileCache<B>;

    fn layer(self, backend: B) -> Self::Backend {
        let manifest = Manifest::load(self.local.clone(), self.cache_root.join("manifest.ndjson"));
        WholeFileCache {
            inner: backend,
            local: self.local,
            cache_root: self.cache_root,
            freshness: self.freshness,
            manifest,
            listing_cache: self.listing_cache,
        }
    }
}

/// Caches whole files from `B` onto a local backend, keyed by a stable
/// hash of the cached path.
pub struct WholeFileCache<B> {
    inner: B,
    local: Arc<dyn Fs>,
    cache_root: PathBuf,
    freshness: FreshnessPolicy,
    manifest: Manifest,
    listing_cache: Option<Arc<ListingCache>>,
}

impl<B: Fs> WholeFileCache<B> {
    fn local_path_for(&self, key: &str) -> PathBuf {
        self.cache_root.join(key)
    }

    fn is_stale(&self, key: &str, path: &Path) -> Result<bool, FsError> {
        let Some(entry) = self.manifest.get(key) else {
            return Ok(true);
        };
        match self.freshness {
            FreshnessPolicy::NeverCheck => Ok(false),
            FreshnessPolicy::CheckOnOpen => {
                let meta = self.inner.metadata(path)?;
                Ok(meta.size != entry.size)
            }
            FreshnessPolicy::ExpireAfterSeconds(secs) => {
                Ok(now_unix() - entry.created_at >= secs as i64)
            }
        }
    }

    fn ensure_cached(&self, path: &Path) -> Result<PathBuf, FsError> {
        let key = cache_key(path);
        let local_path = self.local_path_for(&key);
        if self.is_stale(&key, path)? {
            let data = self.inner.read(path)?;
            self.local.write(&local_path, &data)?;
            let size = data.len() as u64;
            self.manifest
                .put(ManifestEntry {
                    url: key,
                    local_path: local_path.clone(),
                    size,
                    mtime: 0,
                    checksum: None,
                    created_at: now_unix(),
                })
                .map_err(to_fs_error)?;
        }
        Ok(local_path)
    }

    fn invalidate(&self, path: &Path) {
        let key = cache_key(path);
        let _ = self.manifest.remove(&key);
        if let Some(listing_cache) = &self.listing_cache {
            listing_cache.invalidate(path);
        }
    }
}

impl<B: Fs> FsRead for WholeFileCache<B> {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        let local_path = self.ensure_cached(path)?;
        self.local.read(&local_path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        let local_path = self.ensure_cached(path)?;
        self.local.read_to_string(&local_path)
    }

    fn read_range(&self, path: &Path, offset: u64, len: usize) -> Result<Vec<u8>, FsError> {
        let local_path = self.ensure_cached(path)?;
        self.local.read_range(&local_path, offset, len)
    }

    fn exists(&self, path: &Path) -> Result<bool, FsError> {
        self.inner.exists(path)
    }

    fn metadata(&self, path: &Path) -> Result<Metadata, FsError> {
        self.inner.metadata(path)
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError> {
        let local_path = self.ensure_cached(path)?;
        self.local.open_read(&local_path)
    }
}

impl<B: Fs> FsWrite for WholeFileCache<B> {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        self.inner.write(path, data)?;
        self.invalidate(path);
        Ok(())
    }

    fn append(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        self.inner.append(path, data)?;
        self.invalidate(path);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        self.inner.remove_file(path)?;
        self.invalidate(path);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        self.inner.rename(from, to)?;
        self.invalidate(from);
        self.invalidate(to);
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        self.inner.copy(from, to)?;
        self.invalidate(to);
        Ok(())
    }

    fn truncate(&self, path: &Path, size: u64) -> Result<(), FsError> {
        self.inner.truncate(path, size)?;
        self.invalidate(path);
        Ok(())
    }

    fn open_write(&self, path: &Path) -> Result<Box<dyn Write + Send>, FsError> {
        self.invalidate(path);
        self.inner.open_write(path)
    }
}

impl<B: Fs> FsDir for WholeFileCache<B> {
    fn read_dir(&self, path: &Path) -> Result<ReadDirIter, FsError> {
        self.inner.read_dir(path)
    }

    fn create_dir(&self, path: &Path) -> Result<(), FsError> {
        self.inner.create_dir(path)?;
        if let Some(lc) = &self.listing_cache {
            lc.invalidate(path);
        }
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        self.inner.create_dir_all(path)?;
        if let Some(lc) = &self.listing_cache {
            lc.invalidate(path);
        }
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<(), FsError> {
        self.inner.remove_dir(path)?;
        if let Some(lc) = &self.listing_cache {
            lc.invalidate(path);
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), FsError> {
        self.inner.remove_dir_all(path)?;
        if let Some(lc) = &self.listing_cache {
            lc.invalidate(path);
        }
        Ok(())
    }
}
