//! Simple caching wrapper: like [`super::whole_file`] but with no
//! freshness check and no manifest — once a path has a local copy, it is
//! served forever, and there is nothing recorded to read it back out on
//! restart. Intended for large counts of immutable objects where the
//! manifest bookkeeping of [`super::whole_file::WholeFileCache`] is pure
//! overhead.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache_fs::cache_key;
use crate::{Fs, FsDir, FsError, FsRead, FsWrite, Layer, Metadata, ReadDirIter};

/// Configuration consumed by [`SimpleCacheLayer::layer`].
pub struct SimpleCacheLayer {
    /// Where cached copies live.
    pub cache_root: PathBuf,
    /// Backend the cache directory lives on.
    pub local: Arc<dyn Fs>,
}

impl<B: Fs> Layer<B> for SimpleCacheLayer {
    type Backend = SimpleCache<B>;

    fn layer(self, backend: B) -> Self::Backend {
        SimpleCache {
            inner: backend,
            local: self.local,
            cache_root: self.cache_root,
        }
    }
}

/// Append-only whole-file cache over `B`: no freshness tracking, no
/// metadata, a cached path is never refetched once it exists locally.
pub struct SimpleCache<B> {
    inner: B,
    local: Arc<dyn Fs>,
    cache_root: PathBuf,
}

impl<B: Fs> SimpleCache<B> {
    fn local_path_for(&self, path: &Path) -> PathBuf {
        self.cache_root.join(cache_key(path))
    }

    fn ensure_cached(&self, path: &Path) -> Result<PathBuf, FsError> {
        let local_path = self.local_path_for(path);
        if !self.local.exists(&local_path)? {
            let data = self.inner.read(path)?;
            self.local.write(&local_path, &data)?;
        }
        Ok(local_path)
    }
}

impl<B: Fs> FsRead for SimpleCache<B> {
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

impl<B: Fs> FsWrite for SimpleCache<B> {
    // Writes go straight to the inner FS. There is no manifest to
    // invalidate, so a write does not drop a stale local copy by itself;
    // callers that mutate cached objects through this layer should not
    // expect to see the update locally. Append-only means append-only.
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        self.inner.write(path, data)
    }

    fn append(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        self.inner.append(path, data)
    }

    fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        self.inner.remove_file(path)?;
        let _ = self.local.remove_file(&self.local_path_for(path));
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        self.inner.rename(from, to)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        self.inner.copy(from, to)
    }

    fn truncate(&self, path: &Path, size: u64) -> Result<(), FsError> {
        self.inner.truncate(path, size)
    }

    fn open_write(&self, path: &Path) -> Result<Box<dyn Write + Send>, FsError> {
        self.inner.open_write(path)
    }
}

impl<B: Fs> FsDir for SimpleCache<B> {
    fn read_dir(&self, path: &Path) -> Result<ReadDirIter, FsError> {
        self.inner.read_dir(path)
    }

    fn create_dir(&self, path: &Path) -> Result<(), FsError> {
        self.inner.create_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        self.inner.create_dir_all(path)
    }

    fn remove_dir(&self, path: &Path) -> Result<(), FsError> {
        self.inner.remove_dir(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), FsError> {
        self.inner.remove_dir_all(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryFs;
    use crate::LayerExt;

    fn cache() -> SimpleCache<MemoryFs> {
        let remote = MemoryFs::new();
        remote.write(Path::new("/a.txt"), b"hello").unwrap();
        let local: Arc<dyn Fs> = Arc::new(MemoryFs::new());
        local.create_dir_all(Path::new("/cache")).unwrap();
        remote.layer(SimpleCacheLayer {
            cache_root: PathBuf::from("/cache"),
            local,
        })
    }

    #[test]
    fn first_read_populates_cache_then_serves_locally() {
        let fs = cache();
        assert_eq!(fs.read(Path::new("/a.txt")).unwrap(), b"hello");
        assert_eq!(fs.read(Path::new("/a.txt")).unwrap(), b"hello");
    }

    #[test]
    fn remove_drops_local_copy_too() {
        let fs = cache();
        fs.read(Path::new("/a.txt")).unwrap();
        fs.remove_file(Path::new("/a.txt")).unwrap();
        assert!(!fs.exists(Path::new("/a.txt")).unwrap());
    }

    #[test]
    fn write_does_not_refresh_already_cached_copy() {
        let fs = cache();
        fs.read(Path::new("/a.txt")).unwrap();
        fs.write(Path::new("/a.txt"), b"updated").unwrap();
        // Append-only cache: the stale local copy is still served.
        assert_eq!(fs.read(Path::new("/a.txt")).unwrap(), b"hello");
    }
}
