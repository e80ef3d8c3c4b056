//! In-memory reference [`Fs`] backend.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::SystemTime;

use crate::{
    DirEntry, FileType, FsDir, FsError, FsRead, FsWrite, Metadata, Permissions, ReadDirIter,
};

/// A filesystem backed entirely by process memory.
///
/// Useful for tests, mocking, and as the target of a caching layer during
/// development. Files and directories are stored in two maps guarded by
/// `RwLock`, following the same interior-mutability pattern every other
/// backend in this crate uses so methods can take `&self`.
pub struct MemoryFs {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
    dirs: RwLock<HashSet<PathBuf>>,
    next_inode: AtomicU64,
    inodes: RwLock<HashMap<PathBuf, u64>>,
}

impl MemoryFs {
    /// An empty filesystem with just the root directory `/`.
    pub fn new() -> Self {
        let fs = Self {
            files: RwLock::new(HashMap::new()),
            dirs: RwLock::new(HashSet::new()),
            next_inode: AtomicU64::new(2),
            inodes: RwLock::new(HashMap::new()),
        };
        fs.dirs.write().unwrap().insert(PathBuf::from("/"));
        fs.inodes.write().unwrap().insert(PathBuf::from("/"), 1);
        fs
    }

    fn assign_inode(&self, path: &Path) -> u64 {
        let mut inodes = self.inodes.write().unwrap();
        if let Some(&inode) = inodes.get(path) {
            return inode;
        }
        let inode = self.next_inode.fetch_add(1, Ordering::SeqCst);
        inodes.insert(path.to_path_buf(), inode);
        inode
    }

    fn file_type_of(&self, path: &Path) -> Option<FileType> {
        if self.dirs.read().unwrap().contains(path) {
            Some(FileType::Directory)
        } else if self.files.read().unwrap().contains_key(path) {
            Some(FileType::File)
        } else {
            None
        }
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            None => true,
            Some(p) if p == Path::new("") => true,
            Some(p) => self.dirs.read().unwrap().contains(p),
        }
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FsRead for MemoryFs {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| FsError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| FsError::InvalidData {
            path: path.to_path_buf(),
            details: "file contents are not valid UTF-8".into(),
        })
    }

    fn read_range(&self, path: &Path, offset: u64, len: usize) -> Result<Vec<u8>, FsError> {
        let data = self.read(path)?;
        let start = offset as usize;
        if start >= data.len() {
            return Ok(Vec::new());
        }
        let end = (start + len).min(data.len());
        Ok(data[start..end].to_vec())
    }

    fn exists(&self, path: &Path) -> Result<bool, FsError> {
        Ok(self.file_type_of(path).is_some())
    }

    fn metadata(&self, path: &Path) -> Result<Metadata, FsError> {
        let file_type = self.file_type_of(path).ok_or_else(|| FsError::NotFound {
            path: path.to_path_buf(),
        })?;
        let size = match file_type {
            FileType::File => self
                .files
                .read()
                .unwrap()
                .get(path)
                .map(|d| d.len() as u64)
                .unwrap_or(0),
            _ => 0,
        };
        let inode = self.inodes.read().unwrap().get(path).copied().unwrap_or(0);
        Ok(Metadata {
            file_type,
            size,
            permissions: Permissions::default_file(),
            created: SystemTime::UNIX_EPOCH,
            modified: SystemTime::UNIX_EPOCH,
            accessed: SystemTime::UNIX_EPOCH,
            inode,
            nlink: 1,
        })
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError> {
        let data = self.read(path)?;
        Ok(Box::new(std::io::Cursor::new(data)))
    }
}

impl FsWrite for MemoryFs {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        if !self.parent_exists(path) {
            return Err(FsError::NotFound {
                path: path.parent().unwrap_or(path).to_path_buf(),
            });
        }
        self.assign_inode(path);
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn append(&self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        let mut files = self.files.write().unwrap();
        files
            .entry(path.to_path_buf())
            .or_default()
            .extend_from_slice(data);
        drop(files);
        self.assign_inode(path);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        self.files
            .write()
            .unwrap()
            .remove(path)
            .ok_or_else(|| FsError::NotFound {
                path: path.to_path_buf(),
            })?;
        self.inodes.write().unwrap().remove(path);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        let mut files = self.files.write().unwrap();
        let data = files.remove(from).ok_or_else(|| FsError::NotFound {
            path: from.to_path_buf(),
        })?;
        files.insert(to.to_path_buf(), data);
        drop(files);
        if let Some(inode) = self.inodes.write().unwrap().remove(from) {
            self.inodes.write().unwrap().insert(to.to_path_buf(), inode);
        }
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        let data = self.read(from)?;
        self.write(to, &data)
    }

    fn truncate(&self, path: &Path, size: u64) -> Result<(), FsError> {
        let mut files = self.files.write().unwrap();
        let data = files.get_mut(path).ok_or_else(|| FsError::NotFound {
            path: path.to_path_buf(),
        })?;
        data.resize(size as usize, 0);
        Ok(())
    }

    fn open_write(&self, path: &Path) -> Result<Box<dyn Write + Send>, FsError> {
        if !self.files.read().unwrap().contains_key(path) {
            self.write(path, &[])?;
        }
        Ok(Box::new(std::io::Cursor::new(Vec::new())))
    }
}

impl FsDir for MemoryFs {
    fn read_dir(&self, path: &Path) -> Result<ReadDirIter, FsError> {
        if !self.dirs.read().unwrap().contains(path) {
            return Err(FsError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let mut entries = Vec::new();
        let inodes = self.inodes.read().unwrap();

        for (file_path, data) in self.files.read().unwrap().iter() {
            if file_path.parent() == Some(path) {
                if let Some(name) = file_path.file_name() {
                    entries.push(Ok(DirEntry {
                        name: name.to_string_lossy().into_owned(),
                        path: file_path.clone(),
                        file_type: FileType::File,
                        size: data.len() as u64,
                        inode: inodes.get(file_path).copied().unwrap_or(0),
                    }));
                }
            }
        }

        for dir_path in self.dirs.read().unwrap().iter() {
            if dir_path != path && dir_path.parent() == Some(path) {
                if let Some(name) = dir_path.file_name() {
                    entries.push(Ok(DirEntry {
                        name: name.to_string_lossy().into_owned(),
                        path: dir_path.clone(),
                        file_type: FileType::Directory,
                        size: 0,
                        inode: inodes.get(dir_path).copied().unwrap_or(0),
                    }));
                }
            }
        }

        Ok(ReadDirIter::from_vec(entries))
    }

    fn create_dir(&self, path: &Path) -> Result<(), FsError> {
        let mut dirs = self.dirs.write().unwrap();
        if dirs.contains(path) {
            return Err(FsError::AlreadyExists {
                path: path.to_path_buf(),
                operation: "create_dir",
            });
        }
        if let Some(parent) = path.parent() {
            if parent != Path::new("") && !dirs.contains(parent) {
                return Err(FsError::NotFound {
                    path: parent.to_path_buf(),
                });
            }
        }
        dirs.insert(path.to_path_buf());
        drop(dirs);
        self.assign_inode(path);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            let mut dirs = self.dirs.write().unwrap();
            if !dirs.contains(&current) {
                dirs.insert(current.clone());
                drop(dirs);
                self.assign_inode(&current);
            }
        }
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<(), FsError> {
        let has_children = self
            .files
            .read()
            .unwrap()
            .keys()
            .any(|p| p.parent() == Some(path))
            || self
                .dirs
                .read()
                .unwrap()
                .iter()
                .any(|p| p != path && p.parent() == Some(path));
        if has_children {
            return Err(FsError::DirectoryNotEmpty {
                path: path.to_path_buf(),
            });
        }
        if !self.dirs.write().unwrap().remove(path) {
            return Err(FsError::NotFound {
                path: path.to_path_buf(),
            });
        }
        self.inodes.write().unwrap().remove(path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), FsError> {
        self.files.write().unwrap().retain(|p, _| !p.starts_with(path));
        self.dirs.write().unwrap().retain(|p| !p.starts_with(path));
        self.inodes
            .write()
            .unwrap()
            .retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}
