//! # Caching Wrapper Filesystems
//!
//! Three [`crate::Layer`] middlewares, all composing over an inner FS the
//! way [`crate::layer`]'s `CacheMiddleware` example does: [`whole_file`]
//! copies the whole remote object down on first open, [`simple`] does the
//! same with no freshness tracking at all, [`block_sparse`] faults in
//! fixed-size blocks on demand into a sparse local file, reusing the block
//! math [`crate::buffer::BlockLruBuffer`] uses for in-memory reads.
//!
//! All three persist a small manifest — one JSON object per line — under
//! the cache root, matching `spec.md` §6's "`(url, local_path, size, mtime,
//! checksum_optional, created_at)` rows".

pub mod block_sparse;
pub mod simple;
pub mod whole_file;

pub use block_sparse::{BlockSparseCache, BlockSparseCacheLayer};
pub use simple::{SimpleCache, SimpleCacheLayer};
pub use whole_file::{WholeFileCache, WholeFileCacheLayer};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::{Fs, FsError, VfsError, VfsExt, VfsResult};

/// When a cached copy is considered stale enough to re-fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FreshnessPolicy {
    /// Serve the cached copy forever once fetched (the default).
    #[default]
    NeverCheck,
    /// Compare the inner FS's current size against the manifest on every
    /// open; refetch on mismatch.
    CheckOnOpen,
    /// Refetch once `created_at` is older than this many seconds.
    ExpireAfterSeconds(u64),
}

/// One row of the cache manifest (`spec.md` §6 "Persisted state").
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// The path on the inner (wrapped) FS this entry caches.
    pub url: String,
    /// Where the cached bytes live on the local FS.
    pub local_path: PathBuf,
    /// Size in bytes at the time of caching.
    pub size: u64,
    /// Inner FS's reported size as of the last freshness check; re-used
    /// as the staleness signal for [`FreshnessPolicy::CheckOnOpen`].
    pub mtime: i64,
    /// Optional content checksum, when the inner FS can supply one cheaply.
    pub checksum: Option<String>,
    /// Unix timestamp this entry was created, for
    /// [`FreshnessPolicy::ExpireAfterSeconds`].
    pub created_at: i64,
}

pub(crate) fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

pub(crate) fn cache_key(path: &Path) -> String {
    blake3::hash(path.to_string_lossy().as_bytes())
        .to_hex()
        .to_string()
}

pub(crate) fn to_fs_error(err: VfsError) -> FsError {
    match err {
        VfsError::Backend(fs_err) => fs_err,
        other => FsError::Backend(other.to_string()),
    }
}

/// Append-only, newline-delimited-JSON manifest of cached objects,
/// persisted through the local FS backing the cache.
pub(crate) struct Manifest {
    local: Arc<dyn Fs>,
    path: PathBuf,
    entries: Mutex<HashMap<String, ManifestEntry>>,
}

impl Manifest {
    pub(crate) fn load(local: Arc<dyn Fs>, path: PathBuf) -> Self {
        let mut entries = HashMap::new();
        if let Ok(text) = local.read_to_string(&path) {
            for line in text.lines() {
                if let Some(entry) = parse_entry(line) {
                    entries.insert(entry.url.clone(), entry);
                }
            }
        }
        Self {
            local,
            path,
            entries: Mutex::new(entries),
        }
    }

    pub(crate) fn get(&self, url: &str) -> Option<ManifestEntry> {
        self.entries.lock().unwrap().get(url).cloned()
    }

    pub(crate) fn put(&self, entry: ManifestEntry) -> VfsResult<()> {
        self.entries.lock().unwrap().insert(entry.url.clone(), entry);
        self.flush()
    }

    pub(crate) fn remove(&self, url: &str) -> VfsResult<()> {
        self.entries.lock().unwrap().remove(url);
        self.flush()
    }

    fn flush(&self) -> VfsResult<()> {
        let entries = self.entries.lock().unwrap();
        let mut buf = String::new();
        for entry in entries.values() {
            buf.push_str(&serialize_entry(entry));
            buf.push('\n');
        }
        self.local.pipe_file(&self.path, buf.as_bytes())
    }
}

#[cfg(feature = "serde")]
fn parse_entry(line: &str) -> Option<ManifestEntry> {
    serde_json::from_str(line).ok()
}

#[cfg(feature = "serde")]
fn serialize_entry(entry: &ManifestEntry) -> String {
    serde_json::to_string(entry).expect("ManifestEntry always serializes")
}

#[cfg(not(feature = "serde"))]
fn parse_entry(_line: &str) -> Option<ManifestEntry> {
    None
}

#[cfg(not(feature = "serde"))]
fn serialize_entry(_entry: &ManifestEntry) -> String {
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryFs;

    #[test]
    fn manifest_round_trips_through_local_fs() {
        let local: Arc<dyn Fs> = Arc::new(MemoryFs::new());
        let manifest = Manifest::load(local.clone(), PathBuf::from("/manifest.ndjson"));
        manifest
            .put(ManifestEntry {
                url: "/remote/a".to_string(),
                local_path: PathBuf::from("/cache/aaa"),
                size: 5,
                mtime: 0,
                checksum: None,
                created_at: 100,
            })
            .unwrap();

        let reloaded = Manifest::load(local, PathBuf::from("/manifest.ndjson"));
        let entry = reloaded.get("/remote/a").unwrap();
        assert_eq!(entry.size, 5);
        assert_eq!(entry.local_path, PathBuf::from("/cache/aaa"));
    }

    #[test]
    fn manifest_remove_drops_entry() {
        let local: Arc<dyn Fs> = Arc::new(MemoryFs::new());
        let manifest = Manifest::load(local, PathBuf::from("/manifest.ndjson"));
        manifest
            .put(ManifestEntry {
                url: "/a".to_string(),
                local_path: PathBuf::from("/cache/a"),
                size: 0,
                mtime: 0,
                checksum: None,
                created_at: 0,
            })
            .unwrap();
        manifest.remove("/a").unwrap();
        assert!(manifest.get("/a").is_none());
    }
}
