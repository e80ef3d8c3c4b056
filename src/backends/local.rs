//! [`Fs`] backend backed directly by the host filesystem via `std::fs`.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::{
    DirEntry, FileType, FsDir, FsError, FsRead, FsWrite, Metadata, Permissions, ReadDirIter,
    SelfResolving,
};

/// Delegates every operation straight to `std::fs`, rooted at an absolute
/// base directory.
///
/// The OS resolves `.`/`..` and symlinks on our behalf, so `LocalFs`
/// implements [`SelfResolving`] — callers above it in the stack skip
/// virtual path resolution.
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Root all operations under `root`. `root` must already exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        let relative = path.strip_prefix("/").unwrap_or(path);
        self.root.join(relative)
    }

    fn io_err(&self, error: std::io::Error, path: &Path, operation: &'static str) -> FsError {
        match error.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied {
                path: path.to_path_buf(),
                operation,
            },
            std::io::ErrorKind::AlreadyExists => FsError::AlreadyExists {
                path: path.to_path_buf(),
                operation,
            },
            _ => FsError::Io {
                operation,
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    fn file_type_of(meta: &fs::Metadata) -> FileType {
        if meta.is_dir() {
            FileType::Directory
        } else if meta.file_type().is_symlink() {
            FileType::Symlink
        } else {
            FileType::File
        }
    }
}

impl SelfResolving for LocalFs {}

impl FsRead for LocalFs {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        fs::read(self.full_path(path)).map_err(|e| self.io_err(e, path, "read"))
    }

    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        fs::read_to_string(self.full_path(path)).map_err(|e| self.io_err(e, path, "read"))
    }

    fn read_range(&self, path: &Path, offset: u64, len: usize) -> Result<Vec<u8>, FsError> {
        use std::io::{Seek, SeekFrom};
        let mut file =
            fs::File::open(self.full_path(path)).map_err(|e| self.io_err(e, path, "read"))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| self.io_err(e, path, "read"))?;
        let mut buf = vec![0u8; len];
        let mut total = 0;
        loop {
            match file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) => return Err(self.io_err(e, path, "read")),
            }
        }
        buf.truncate(total);
        Ok(buf)
    }

    fn exists(&self, path: &Path) -> Result<bool, FsError> {
        Ok(self.full_path(path).exists())
    }

    fn metadata(&self, path: &Path) -> Result<Metadata, FsError> {
        let meta =
            fs::metadata(self.full_path(path)).map_err(|e| self.io_err(e, path, "metadata"))?;
        Ok(Metadata {
            file_type: Self::file_type_of(&meta),
            size: meta.len(),
            permissions: Permissions::from_mode(mode_of(&meta)),
            created: meta.created().unwrap_or(SystemTime::UNIX_EPOCH),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            accessed: meta.accessed().unwrap_or(SystemTime::UNIX_EPOCH),
            inode: 0,
            nlink: 1,
        })
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError> {
        let file =
            fs::File::open(self.full_path(path)).map_err(|e| self.io_err(e, path, "read"))?;
        Ok(Box::new(file))
    }
}

impl FsWrite for LocalFs {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        fs::write(self.full_path(path), data).map_err(|e| self.io_err(e, path, "write"))
    }

    fn append(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.full_path(path))
            .map_err(|e| self.io_err(e, path, "write"))?;
        file.write_all(data).map_err(|e| self.io_err(e, path, "write"))
    }

    fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_file(self.full_path(path)).map_err(|e| self.io_err(e, path, "remove"))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        fs::rename(self.full_path(from), self.full_path(to))
            .map_err(|e| self.io_err(e, from, "rename"))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        fs::copy(self.full_path(from), self.full_path(to))
            .map(|_| ())
            .map_err(|e| self.io_err(e, from, "copy"))
    }

    fn truncate(&self, path: &Path, size: u64) -> Result<(), FsError> {
        let file = fs::OpenOptions::new()
            .write(true)
            .open(self.full_path(path))
            .map_err(|e| self.io_err(e, path, "truncate"))?;
        file.set_len(size).map_err(|e| self.io_err(e, path, "truncate"))
    }

    fn open_write(&self, path: &Path) -> Result<Box<dyn Write + Send>, FsError> {
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.full_path(path))
            .map_err(|e| self.io_err(e, path, "write"))?;
        Ok(Box::new(file))
    }
}

impl FsDir for LocalFs {
    fn read_dir(&self, path: &Path) -> Result<ReadDirIter, FsError> {
        let dir = fs::read_dir(self.full_path(path)).map_err(|e| self.io_err(e, path, "read_dir"))?;
        let mut entries = Vec::new();
        for entry in dir {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    entries.push(Err(self.io_err(e, path, "read_dir")));
                    continue;
                }
            };
            let meta = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    entries.push(Err(self.io_err(e, path, "read_dir")));
                    continue;
                }
            };
            entries.push(Ok(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: path.join(entry.file_name()),
                file_type: Self::file_type_of(&meta),
                size: meta.len(),
                inode: 0,
            }));
        }
        Ok(ReadDirIter::from_vec(entries))
    }

    fn create_dir(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir(self.full_path(path)).map_err(|e| self.io_err(e, path, "create_dir"))
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir_all(self.full_path(path)).map_err(|e| self.io_err(e, path, "create_dir"))
    }

    fn remove_dir(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_dir(self.full_path(path)).map_err(|e| self.io_err(e, path, "remove_dir"))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_dir_all(self.full_path(path)).map_err(|e| self.io_err(e, path, "remove_dir"))
    }
}

#[cfg(unix)]
fn mode_of(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    meta.mode()
}

#[cfg(not(unix))]
fn mode_of(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let fs = LocalFs::new(dir.path());
        fs.write(Path::new("/a.txt"), b"hello").unwrap();
        assert_eq!(fs.read(Path::new("/a.txt")).unwrap(), b"hello");
    }

    #[test]
    fn read_range_returns_slice() {
        let dir = tempdir().unwrap();
        let fs = LocalFs::new(dir.path());
        fs.write(Path::new("/a.txt"), b"0123456789").unwrap();
        assert_eq!(fs.read_range(Path::new("/a.txt"), 3, 4).unwrap(), b"3456");
    }

    #[test]
    fn create_dir_all_then_list() {
        let dir = tempdir().unwrap();
        let fs = LocalFs::new(dir.path());
        fs.create_dir_all(Path::new("/a/b")).unwrap();
        fs.write(Path::new("/a/b/f.txt"), b"x").unwrap();
        let entries: Vec<_> = fs
            .read_dir(Path::new("/a/b"))
            .unwrap()
            .collect_all()
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_file_reports_not_found() {
        let dir = tempdir().unwrap();
        let fs = LocalFs::new(dir.path());
        assert!(matches!(
            fs.read(Path::new("/missing")),
            Err(FsError::NotFound { .. })
        ));
    }
}
