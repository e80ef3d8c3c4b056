//! # Abstract Filesystem
//!
//! [`VfsExt`] is the path-oriented contract every backend gets for free —
//! the same blanket-extension-trait pattern [`crate::ext::FsExt`] uses,
//! generalized from POSIX metadata to the richer [`FileEntry`] shape and
//! from single-shot reads to bulk, glob, and cross-FS copy operations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::buffer::RawFetch;
use crate::file::{read_buffer_from_strategy, BufferedFile};
use crate::{DirEntry, EntryKind, Fs, FileEntry, FsError, OnError, VfsError, VfsResult};

fn dir_entry_to_file_entry(entry: DirEntry) -> FileEntry {
    FileEntry {
        name: entry.path,
        kind: EntryKind::from(entry.file_type),
        size: Some(entry.size),
        created: None,
        modified: None,
        checksum: None,
        extra: HashMap::new(),
    }
}

/// Options shared by [`VfsExt::cp`], [`get`], and [`put`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOptions {
    /// Recurse into a directory source. A `false` here makes a directory
    /// source a no-op rather than an error.
    pub recursive: bool,
    /// Create missing intermediate directories instead of failing with
    /// [`VfsError::ParentMissing`].
    pub auto_mkdir: bool,
    /// Whether the caller's original source string ended in `/`. For a
    /// directory source this selects "copy contents only" (`true`) over
    /// "copy the directory itself under dst" (`false`); meaningless for
    /// a file source. Lost once the path becomes a [`Path`], so it must
    /// be passed explicitly.
    pub src_trailing_slash: bool,
    /// Whether the caller's original destination string ended in `/`.
    /// For a file source whose destination does not yet exist, this
    /// selects "create dst as a directory and place the file inside"
    /// over "overwrite at that exact path". Lost once the path becomes
    /// a [`Path`], so it must be passed explicitly.
    pub dst_trailing_slash: bool,
    /// Cap on recursion depth for directory/glob sources.
    pub max_depth: Option<usize>,
}

/// Extension methods every [`Fs`] backend gets for free: the path-oriented
/// operations (`spec.md` §4.8) layered on top of the POSIX-flavored core
/// traits.
pub trait VfsExt: Fs {
    /// Metadata for a single path, in the richer [`FileEntry`] shape.
    fn info(&self, path: &Path) -> VfsResult<FileEntry> {
        let meta = self.metadata(path)?;
        Ok(FileEntry {
            name: path.to_path_buf(),
            kind: EntryKind::from(meta.file_type),
            size: Some(meta.size),
            created: None,
            modified: None,
            checksum: None,
            extra: HashMap::new(),
        })
    }

    /// List the direct children of a directory.
    fn ls(&self, path: &Path) -> VfsResult<Vec<FileEntry>> {
        let entries = self.read_dir(path)?.collect_all()?;
        Ok(entries.into_iter().map(dir_entry_to_file_entry).collect())
    }

    /// `true` unless the path is missing.
    fn path_exists(&self, path: &Path) -> VfsResult<bool> {
        Ok(self.exists(path)?)
    }

    /// `true` if `path` exists and is a regular file.
    fn isfile(&self, path: &Path) -> VfsResult<bool> {
        match self.metadata(path) {
            Ok(m) => Ok(m.is_file()),
            Err(FsError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// `true` if `path` exists and is a directory.
    fn isdir(&self, path: &Path) -> VfsResult<bool> {
        match self.metadata(path) {
            Ok(m) => Ok(m.is_dir()),
            Err(FsError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Convenience projection of [`Self::info`].
    fn size(&self, path: &Path) -> VfsResult<Option<u64>> {
        Ok(self.info(path)?.size)
    }

    /// Convenience projection of [`Self::info`].
    fn modified(&self, path: &Path) -> VfsResult<Option<i64>> {
        Ok(self.info(path)?.modified)
    }

    /// Convenience projection of [`Self::info`].
    fn checksum(&self, path: &Path) -> VfsResult<Option<String>> {
        Ok(self.info(path)?.checksum)
    }

    /// Recursively list everything under `path`, honoring `max_depth`
    /// (`None` is unbounded) and `on_error` for per-subtree `ls` failures.
    fn walk(&self, path: &Path, max_depth: Option<usize>, on_error: OnError) -> VfsResult<Vec<FileEntry>> {
        let mut out = Vec::new();
        let mut stack = vec![(path.to_path_buf(), 0usize)];
        while let Some((dir, depth)) = stack.pop() {
            let children = match self.ls(&dir) {
                Ok(c) => c,
                Err(e) => match on_error {
                    OnError::Raise => return Err(e),
                    OnError::Omit => continue,
                    OnError::Return => {
                        out.push(FileEntry {
                            name: dir,
                            kind: EntryKind::Other,
                            size: None,
                            created: None,
                            modified: None,
                            checksum: None,
                            extra: HashMap::from([("error".to_string(), e.to_string())]),
                        });
                        continue;
                    }
                },
            };
            for child in children {
                let is_dir = child.is_dir();
                let child_path = child.name.clone();
                out.push(child);
                if is_dir && max_depth.is_none_or(|max| depth < max) {
                    stack.push((child_path, depth + 1));
                }
            }
        }
        Ok(out)
    }

    /// A flat, sorted list of every file under `path` (directories
    /// omitted).
    fn find(&self, path: &Path, max_depth: Option<usize>) -> VfsResult<Vec<FileEntry>> {
        let mut files: Vec<FileEntry> = self
            .walk(path, max_depth, OnError::Raise)?
            .into_iter()
            .filter(|e| e.is_file())
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Sum of file sizes under `path`.
    fn du(&self, path: &Path) -> VfsResult<u64> {
        Ok(self
            .find(path, None)?
            .iter()
            .filter_map(|e| e.size)
            .sum())
    }

    /// Match `pattern` (supporting `*`, `?`, `[abc]`/`[!abc]`, and `**`
    /// spanning directory boundaries) against every path under the
    /// deepest literal prefix of the pattern.
    fn glob(&self, pattern: &str, max_depth: Option<usize>) -> VfsResult<Vec<FileEntry>> {
        let root = literal_prefix(pattern);
        let mut matches: Vec<FileEntry> = self
            .walk(&root, max_depth, OnError::Raise)?
            .into_iter()
            .filter(|e| glob_match(pattern, &e.name.to_string_lossy()))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches)
    }

    /// Read `[start, end)` of `path`. Negative bounds count from EOF and
    /// require a known size.
    fn cat_file(&self, path: &Path, start: Option<i64>, end: Option<i64>) -> VfsResult<Vec<u8>> {
        let (start, end) = match (start, end) {
            (None, None) => return Ok(self.read(path)?),
            (s, e) => {
                let size = if s.map(|v| v < 0).unwrap_or(false) || e.map(|v| v < 0).unwrap_or(false)
                {
                    Some(self.metadata(path)?.size)
                } else {
                    None
                };
                let start = crate::buffer::resolve_offset(s.unwrap_or(0), size)?;
                let end = match e {
                    Some(v) => crate::buffer::resolve_offset(v, size)?,
                    None => size.unwrap_or(u64::MAX),
                };
                (start, end)
            }
        };
        if end <= start {
            return Ok(Vec::new());
        }
        Ok(self.read_range(path, start, (end - start) as usize)?)
    }

    /// Bulk read. `on_error` governs whether a single failure aborts the
    /// whole call (`Raise`), is dropped from the map (`Omit`), or is
    /// carried as an `Err` alongside the successes (`Return`).
    fn cat(
        &self,
        paths: &[PathBuf],
        on_error: OnError,
    ) -> VfsResult<HashMap<PathBuf, VfsResult<Vec<u8>>>> {
        let mut out = HashMap::with_capacity(paths.len());
        for path in paths {
            match self.cat_file(path, None, None) {
                Ok(data) => {
                    out.insert(path.clone(), Ok(data));
                }
                Err(e) => match on_error {
                    OnError::Raise => return Err(e),
                    OnError::Omit => {}
                    OnError::Return => {
                        out.insert(path.clone(), Err(e));
                    }
                },
            }
        }
        Ok(out)
    }

    /// Best-effort atomic whole-file write.
    fn pipe_file(&self, path: &Path, data: &[u8]) -> VfsResult<()> {
        Ok(self.write(path, data)?)
    }

    /// Create an empty file if absent; otherwise a no-op (backends that
    /// track `modified` update it).
    fn touch(&self, path: &Path) -> VfsResult<()> {
        if !self.exists(path)? {
            self.write(path, &[])?;
        }
        Ok(())
    }

    /// Open a Buffered File over `path` for reading, wrapping
    /// `self.read_range` in the selected read-buffer strategy.
    fn open_for_read(
        self: &Arc<Self>,
        path: &Path,
        strategy: crate::buffer::BufferStrategy,
        block_size: u64,
        max_blocks: usize,
    ) -> VfsResult<BufferedFile>
    where
        Self: Sized + 'static,
    {
        let size = self.metadata(path)?.size;
        let owner = self.clone();
        let path = path.to_path_buf();
        let raw_fetch: RawFetch = Arc::new(move |start, end| {
            Ok(owner.read_range(&path, start, (end - start) as usize)?)
        });
        let buffer = read_buffer_from_strategy(strategy, raw_fetch, block_size, max_blocks, Some(size))?;
        let weak: std::sync::Weak<dyn Fs> = Arc::downgrade(self);
        Ok(BufferedFile::open_read(weak, buffer, Some(size)))
    }

    /// `mkdir(path, create_parents)`.
    fn mkdir(&self, path: &Path, create_parents: bool) -> VfsResult<()> {
        if create_parents {
            self.create_dir_all(path)?;
        } else {
            self.create_dir(path)?;
        }
        Ok(())
    }

    /// Remove an empty directory.
    fn rmdir(&self, path: &Path) -> VfsResult<()> {
        Ok(self.remove_dir(path)?)
    }

    /// Remove a single file.
    fn rm_file(&self, path: &Path) -> VfsResult<()> {
        Ok(self.remove_file(path)?)
    }

    /// Remove each of `paths`; directories require `recursive`. `max_depth`
    /// bounds how far the removal descends (`max_depth=1` removes only
    /// direct children), matching [`Self::walk`]'s own depth semantics
    /// rather than deleting the whole subtree unconditionally.
    fn rm(&self, paths: &[PathBuf], recursive: bool, max_depth: Option<usize>) -> VfsResult<()> {
        for path in paths {
            if self.isdir(path)? {
                if !recursive {
                    continue;
                }
                remove_dir_bounded(self, path, max_depth)?;
            } else {
                self.remove_file(path)?;
            }
        }
        Ok(())
    }

    /// Copy `src` to `dst` within this filesystem, per the copy-semantics
    /// table (`spec.md` §4.8).
    fn cp(&self, src: &Path, dst: &Path, opts: CopyOptions) -> VfsResult<()> {
        copy_between(self, src, self, dst, opts)
    }

    /// Copy each of `srcs` under directory `dst`, preserving basenames.
    fn cp_many(&self, srcs: &[PathBuf], dst: &Path, opts: CopyOptions) -> VfsResult<()> {
        for src in srcs {
            let name = src.file_name().ok_or_else(|| VfsError::InvalidPath {
                path: src.clone(),
                reason: "source has no file name".to_string(),
            })?;
            let mut item_opts = opts;
            item_opts.dst_trailing_slash = true;
            copy_between(self, src, self, &dst.join(name), item_opts)?;
        }
        Ok(())
    }
}

impl<T: Fs + ?Sized> VfsExt for T {}

/// Copy `src` from `src_fs` to `dst` on `dst_fs` (`cp` when the two are
/// the same instance; [`get`]/[`put`] when they aren't).
pub fn copy_between(
    src_fs: &(impl Fs + ?Sized),
    src: &Path,
    dst_fs: &(impl Fs + ?Sized),
    dst: &Path,
    opts: CopyOptions,
) -> VfsResult<()> {
    let src_meta = src_fs.metadata(src)?;

    if src_meta.is_dir() {
        if !opts.recursive {
            return Ok(());
        }
        // Trailing slash on the *source* picks contents-only vs. nest-under-dst;
        // mirrors POSIX `cp -r src/ dst` vs. `cp -r src dst`.
        let target_root = if opts.src_trailing_slash {
            dst.to_path_buf()
        } else {
            let name = src.file_name().ok_or_else(|| VfsError::InvalidPath {
                path: src.to_path_buf(),
                reason: "source has no file name".to_string(),
            })?;
            dst.join(name)
        };
        // `auto_mkdir` governs genuinely missing intermediate parents (here,
        // `dst` itself) — not the copy target, which the directory-copy
        // semantics always create regardless.
        if let Some(parent) = dst.parent() {
            ensure_dir(dst_fs, parent, opts.auto_mkdir)?;
        }
        dst_fs.create_dir_all(&target_root)?;

        for entry in src_fs.find(src, opts.max_depth)? {
            let relative = entry.name.strip_prefix(src).unwrap_or(&entry.name);
            let dest_file = target_root.join(relative);
            if let Some(parent) = dest_file.parent() {
                dst_fs.create_dir_all(parent)?;
            }
            let data = src_fs.read(&entry.name)?;
            dst_fs.write(&dest_file, &data)?;
        }
        return Ok(());
    }

    // Single file.
    let dst_is_dir = dst_fs.isdir(dst)?;
    let final_dst = if dst_is_dir {
        let name = src.file_name().ok_or_else(|| VfsError::InvalidPath {
            path: src.to_path_buf(),
            reason: "source has no file name".to_string(),
        })?;
        dst.join(name)
    } else if opts.dst_trailing_slash {
        ensure_dir(dst_fs, dst, opts.auto_mkdir)?;
        let name = src.file_name().ok_or_else(|| VfsError::InvalidPath {
            path: src.to_path_buf(),
            reason: "source has no file name".to_string(),
        })?;
        dst.join(name)
    } else {
        if let Some(parent) = dst.parent() {
            ensure_dir(dst_fs, parent, opts.auto_mkdir)?;
        }
        dst.to_path_buf()
    };

    let data = src_fs.read(src)?;
    dst_fs.write(&final_dst, &data)?;
    Ok(())
}

/// Remove `path` recursively, never descending past `max_depth` (`None` is
/// unbounded). Files within the bound are removed outright; directories are
/// removed bottom-up only once empty, so content left behind by a shallow
/// `max_depth` simply stays in place instead of forcing the whole subtree
/// (and `path` itself, if it didn't end up empty) away.
fn remove_dir_bounded(
    fs: &(impl Fs + ?Sized),
    path: &Path,
    max_depth: Option<usize>,
) -> VfsResult<()> {
    let entries = fs.walk(path, max_depth, OnError::Raise)?;
    let mut dirs: Vec<PathBuf> = Vec::new();
    for entry in entries {
        if entry.is_dir() {
            dirs.push(entry.name);
        } else {
            fs.remove_file(&entry.name)?;
        }
    }
    dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
    for dir in &dirs {
        if fs.read_dir(dir)?.collect_all()?.is_empty() {
            fs.remove_dir(dir)?;
        }
    }
    if fs.read_dir(path)?.collect_all()?.is_empty() {
        fs.remove_dir(path)?;
    }
    Ok(())
}

fn ensure_dir(fs: &(impl Fs + ?Sized), path: &Path, auto_mkdir: bool) -> VfsResult<()> {
    if fs.isdir(path)? {
        return Ok(());
    }
    if !auto_mkdir {
        return Err(VfsError::ParentMissing {
            path: path.to_path_buf(),
        });
    }
    fs.create_dir_all(path)?;
    Ok(())
}

/// `get(remote, remote_path, local, local_path, ...)`: copy remote→local.
pub fn get(
    remote: &(impl Fs + ?Sized),
    remote_path: &Path,
    local: &(impl Fs + ?Sized),
    local_path: &Path,
    opts: CopyOptions,
) -> VfsResult<()> {
    copy_between(remote, remote_path, local, local_path, opts)
}

/// `put(local, local_path, remote, remote_path, ...)`: copy local→remote.
pub fn put(
    local: &(impl Fs + ?Sized),
    local_path: &Path,
    remote: &(impl Fs + ?Sized),
    remote_path: &Path,
    opts: CopyOptions,
) -> VfsResult<()> {
    copy_between(local, local_path, remote, remote_path, opts)
}

/// The longest prefix of `pattern` containing no wildcard metacharacter,
/// truncated to its last complete path component — the subtree `glob`
/// needs to walk.
fn literal_prefix(pattern: &str) -> PathBuf {
    let cut = pattern
        .find(['*', '?', '['])
        .unwrap_or(pattern.len());
    let prefix = &pattern[..cut];
    match prefix.rfind('/') {
        Some(idx) if idx > 0 => PathBuf::from(&prefix[..idx]),
        Some(_) => PathBuf::from("/"),
        None => PathBuf::from("/"),
    }
}

/// Whole-path glob match. `**` matches any sequence including `/`; a
/// lone `*` never crosses a `/`; `?` matches one non-`/` character;
/// `[abc]`/`[!abc]`/`[^abc]` are character classes with simple `a-z`
/// ranges. An unterminated `[` matches itself literally (never an error).
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_rec(&pattern, &text)
}

fn match_rec(pattern: &[char], text: &[char]) -> bool {
    if pattern.is_empty() {
        return text.is_empty();
    }
    match pattern[0] {
        '*' if pattern.get(1) == Some(&'*') => {
            let rest = &pattern[2..];
            (0..=text.len()).any(|i| match_rec(rest, &text[i..]))
        }
        '*' => {
            let rest = &pattern[1..];
            let mut i = 0;
            loop {
                if match_rec(rest, &text[i..]) {
                    return true;
                }
                if i >= text.len() || text[i] == '/' {
                    return false;
                }
                i += 1;
            }
        }
        '?' => {
            !text.is_empty() && text[0] != '/' && match_rec(&pattern[1..], &text[1..])
        }
        '[' => match parse_class(pattern) {
            Some((negate, ranges, consumed)) => {
                if text.is_empty() {
                    return false;
                }
                let in_class = ranges.iter().any(|&(lo, hi)| text[0] >= lo && text[0] <= hi);
                if in_class != negate {
                    match_rec(&pattern[consumed..], &text[1..])
                } else {
                    false
                }
            }
            None => !text.is_empty() && text[0] == '[' && match_rec(&pattern[1..], &text[1..]),
        },
        c => !text.is_empty() && text[0] == c && match_rec(&pattern[1..], &text[1..]),
    }
}

/// Parses a `[...]` class starting at `pattern[0] == '['`. Returns
/// `(negate, char ranges, chars consumed)`, or `None` if unterminated.
fn parse_class(pattern: &[char]) -> Option<(bool, Vec<(char, char)>, usize)> {
    let close = pattern.iter().position(|&c| c == ']').filter(|&i| i > 1)?;
    let mut i = 1;
    let negate = matches!(pattern.get(1), Some('!') | Some('^'));
    if negate {
        i += 1;
    }
    let mut ranges = Vec::new();
    while i < close {
        if i + 2 < close && pattern[i + 1] == '-' {
            ranges.push((pattern[i], pattern[i + 2]));
            i += 3;
        } else {
            ranges.push((pattern[i], pattern[i]));
            i += 1;
        }
    }
    Some((negate, ranges, close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryFs;

    fn fixture() -> MemoryFs {
        let fs = MemoryFs::new();
        fs.create_dir_all(Path::new("/root/b/d")).unwrap();
        fs.write(Path::new("/root/a.txt"), b"A").unwrap();
        fs.write(Path::new("/root/b/c.txt"), b"BC").unwrap();
        fs.write(Path::new("/root/b/d/e.txt"), b"BDE").unwrap();
        fs
    }

    #[test]
    fn find_is_sorted_and_flat() {
        let fs = fixture();
        let files = fs.find(Path::new("/root"), None).unwrap();
        let names: Vec<_> = files.iter().map(|e| e.name.clone()).collect();
        let mut expected = names.clone();
        expected.sort();
        assert_eq!(names, expected);
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn du_sums_file_sizes() {
        let fs = fixture();
        assert_eq!(fs.du(Path::new("/root")).unwrap(), 1 + 2 + 3);
    }

    #[test]
    fn glob_recursive_matches_all_three() {
        let fs = fixture();
        let matches = fs.glob("/root/**.txt", None).unwrap();
        let names: Vec<String> = matches
            .iter()
            .map(|e| e.name.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["/root/a.txt", "/root/b/c.txt", "/root/b/d/e.txt"]
        );
    }

    #[test]
    fn glob_single_star_does_not_cross_slash() {
        let fs = fixture();
        let matches = fs.glob("/root/*.txt", None).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, Path::new("/root/a.txt"));
    }

    #[test]
    fn glob_unterminated_bracket_is_literal() {
        assert!(glob_match("/root/[a.txt", "/root/[a.txt"));
        assert!(!glob_match("/root/[a.txt", "/root/Xa.txt"));
    }

    #[test]
    fn cat_file_supports_negative_range() {
        let fs = fixture();
        let tail = fs.cat_file(Path::new("/root/b/d/e.txt"), Some(-2), None).unwrap();
        assert_eq!(tail, b"DE");
    }

    #[test]
    fn cat_bulk_return_mode_carries_errors() {
        let fs = fixture();
        let results = fs
            .cat(
                &[PathBuf::from("/root/a.txt"), PathBuf::from("/missing")],
                OnError::Return,
            )
            .unwrap();
        assert!(results[&PathBuf::from("/root/a.txt")].is_ok());
        assert!(results[&PathBuf::from("/missing")].is_err());
    }

    #[test]
    fn cp_file_into_existing_dir_uses_basename() {
        let fs = fixture();
        fs.create_dir(Path::new("/out")).unwrap();
        fs.cp(
            Path::new("/root/a.txt"),
            Path::new("/out"),
            CopyOptions::default(),
        )
        .unwrap();
        assert!(fs.isfile(Path::new("/out/a.txt")).unwrap());
    }

    #[test]
    fn cp_dir_without_recursive_is_noop() {
        let fs = fixture();
        fs.cp(Path::new("/root"), Path::new("/copy"), CopyOptions::default())
            .unwrap();
        assert!(!fs.exists(Path::new("/copy")).unwrap());
    }

    #[test]
    fn cp_dir_recursive_without_trailing_slash_nests_under_dst() {
        let fs = fixture();
        fs.create_dir(Path::new("/dst")).unwrap();
        fs.cp(
            Path::new("/root"),
            Path::new("/dst"),
            CopyOptions {
                recursive: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(fs.isfile(Path::new("/dst/root/a.txt")).unwrap());
    }

    #[test]
    fn cp_dir_recursive_with_trailing_slash_copies_contents_only() {
        let fs = fixture();
        fs.create_dir(Path::new("/dst")).unwrap();
        fs.cp(
            Path::new("/root"),
            Path::new("/dst"),
            CopyOptions {
                recursive: true,
                src_trailing_slash: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(fs.isfile(Path::new("/dst/a.txt")).unwrap());
        assert!(!fs.exists(Path::new("/dst/root")).unwrap());
    }

    #[test]
    fn cp_missing_parent_without_auto_mkdir_fails() {
        let fs = fixture();
        let err = fs
            .cp(
                Path::new("/root/a.txt"),
                Path::new("/no/such/dir/a.txt"),
                CopyOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, VfsError::ParentMissing { .. }));
    }

    #[test]
    fn cp_with_auto_mkdir_creates_parents() {
        let fs = fixture();
        fs.cp(
            Path::new("/root/a.txt"),
            Path::new("/no/such/dir/a.txt"),
            CopyOptions {
                auto_mkdir: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(fs.read(Path::new("/no/such/dir/a.txt")).unwrap(), b"A");
    }

    #[test]
    fn cp_trailing_slash_on_source_selects_contents_vs_nested() {
        let fs = MemoryFs::new();
        fs.create_dir_all(Path::new("/src/sub")).unwrap();
        fs.write(Path::new("/src/f1"), b"1").unwrap();
        fs.write(Path::new("/src/sub/f2"), b"2").unwrap();
        fs.create_dir(Path::new("/dst")).unwrap();
        fs.cp(
            Path::new("/src"),
            Path::new("/dst"),
            CopyOptions {
                recursive: true,
                src_trailing_slash: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(fs.isfile(Path::new("/dst/f1")).unwrap());
        assert!(fs.isfile(Path::new("/dst/sub/f2")).unwrap());

        let fs2 = MemoryFs::new();
        fs2.create_dir_all(Path::new("/src/sub")).unwrap();
        fs2.write(Path::new("/src/f1"), b"1").unwrap();
        fs2.write(Path::new("/src/sub/f2"), b"2").unwrap();
        fs2.create_dir(Path::new("/dst")).unwrap();
        fs2.cp(
            Path::new("/src"),
            Path::new("/dst"),
            CopyOptions {
                recursive: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(fs2.isfile(Path::new("/dst/src/f1")).unwrap());
        assert!(fs2.isfile(Path::new("/dst/src/sub/f2")).unwrap());
    }

    #[test]
    fn put_copies_across_two_filesystem_instances() {
        let local = fixture();
        let remote = MemoryFs::new();
        put(
            &local,
            Path::new("/root/a.txt"),
            &remote,
            Path::new("/a.txt"),
            CopyOptions::default(),
        )
        .unwrap();
        assert_eq!(remote.read(Path::new("/a.txt")).unwrap(), b"A");
    }
}
