//! # Key-Value Mapping
//!
//! [`FsMapper`] projects a subtree of an [`Fs`] as a flat key-value store:
//! keys are `/`-joined relative paths, values are bytes. Grounded in the
//! same path-join discipline [`crate::vfs`] uses for copy destinations.

use std::path::{Path, PathBuf};

use crate::{Fs, VfsError, VfsExt, VfsResult};

/// A mapping view over the subtree rooted at `root` on some backend `B`.
///
/// Iteration (`FsMapper::iter`) is an eager snapshot: it lists the whole
/// tree up front, so mutation during iteration is not reflected in the
/// iterator already returned — consistent with `spec.md`'s "mutation
/// during iteration is undefined".
pub struct FsMapper<'a, B: Fs + ?Sized> {
    fs: &'a B,
    root: PathBuf,
}

impl<'a, B: Fs + ?Sized> FsMapper<'a, B> {
    /// A mapping view over `root` on `fs`.
    pub fn new(fs: &'a B, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    fn full_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn key_of(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.root)
            .ok()
            .map(|rel| rel.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/"))
    }

    /// Look up `key`. Fails with [`VfsError::KeyMissing`] if absent.
    pub fn get(&self, key: &str) -> VfsResult<Vec<u8>> {
        let path = self.full_path(key);
        match self.fs.cat_file(&path, None, None) {
            Ok(data) => Ok(data),
            Err(VfsError::Backend(crate::FsError::NotFound { .. })) => Err(VfsError::KeyMissing {
                key: key.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Assign `value` to `key`, creating it if absent.
    pub fn set(&self, key: &str, value: &[u8]) -> VfsResult<()> {
        let path = self.full_path(key);
        if let Some(parent) = path.parent() {
            if !self.fs.isdir(parent)? {
                self.fs.mkdir(parent, true)?;
            }
        }
        self.fs.pipe_file(&path, value)
    }

    /// Remove `key`. Fails with [`VfsError::KeyMissing`] if absent.
    pub fn delete(&self, key: &str) -> VfsResult<()> {
        let path = self.full_path(key);
        match self.fs.rm_file(&path) {
            Ok(()) => Ok(()),
            Err(VfsError::Backend(crate::FsError::NotFound { .. })) => Err(VfsError::KeyMissing {
                key: key.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    /// `true` if `key` currently resolves to a file.
    pub fn contains(&self, key: &str) -> VfsResult<bool> {
        self.fs.isfile(&self.full_path(key))
    }

    /// Number of keys currently under `root`.
    pub fn len(&self) -> VfsResult<usize> {
        Ok(self.iter()?.len())
    }

    /// `true` if `root` has no keys.
    pub fn is_empty(&self) -> VfsResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Eager snapshot of every `(key, value)` pair under `root`.
    pub fn iter(&self) -> VfsResult<Vec<(String, Vec<u8>)>> {
        let files = self.fs.find(&self.root, None)?;
        let mut out = Vec::with_capacity(files.len());
        for entry in files {
            let Some(key) = self.key_of(&entry.name) else {
                continue;
            };
            match self.fs.cat_file(&entry.name, None, None) {
                Ok(data) => out.push((key, data)),
                Err(_) => continue,
            }
        }
        Ok(out)
    }

    /// Eager snapshot of every key under `root`, without reading values.
    pub fn keys(&self) -> VfsResult<Vec<String>> {
        Ok(self
            .fs
            .find(&self.root, None)?
            .into_iter()
            .filter_map(|e| self.key_of(&e.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryFs;

    fn fixture() -> MemoryFs {
        let fs = MemoryFs::new();
        fs.create_dir(Path::new("/kv")).unwrap();
        fs
    }

    #[test]
    fn set_then_get_round_trips() {
        let fs = fixture();
        let mapper = FsMapper::new(&fs, "/kv");
        mapper.set("a/b", b"value").unwrap();
        assert_eq!(mapper.get("a/b").unwrap(), b"value");
    }

    #[test]
    fn get_missing_key_errors() {
        let fs = fixture();
        let mapper = FsMapper::new(&fs, "/kv");
        assert!(matches!(
            mapper.get("missing"),
            Err(VfsError::KeyMissing { .. })
        ));
    }

    #[test]
    fn delete_removes_key() {
        let fs = fixture();
        let mapper = FsMapper::new(&fs, "/kv");
        mapper.set("x", b"1").unwrap();
        mapper.delete("x").unwrap();
        assert!(!mapper.contains("x").unwrap());
    }

    #[test]
    fn iter_is_an_eager_snapshot() {
        let fs = fixture();
        let mapper = FsMapper::new(&fs, "/kv");
        mapper.set("one", b"1").unwrap();
        mapper.set("two", b"2").unwrap();
        let mut pairs = mapper.iter().unwrap();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("one".to_string(), b"1".to_vec()),
                ("two".to_string(), b"2".to_vec()),
            ]
        );
    }

    #[test]
    fn len_counts_keys() {
        let fs = fixture();
        let mapper = FsMapper::new(&fs, "/kv");
        assert_eq!(mapper.len().unwrap(), 0);
        mapper.set("a", b"1").unwrap();
        assert_eq!(mapper.len().unwrap(), 1);
    }
}
