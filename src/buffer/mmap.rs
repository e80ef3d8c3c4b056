//! Memory-mapped, sparse-file-backed read buffer.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use memmap2::MmapMut;

use crate::{VfsError, VfsResult};

use super::{RawFetch, ReadBuffer};

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_temp_path() -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("anyfs-mmap-{}-{}.tmp", std::process::id(), n))
}

/// Backs reads with a sparse local file, memory-mapped; pages of
/// `blocksize` are faulted in on demand from `raw_fetch` and written into
/// the mapping. Bytes already present never touch the backend again.
pub struct MmapBuffer {
    raw_fetch: RawFetch,
    blocksize: u64,
    size: u64,
    path: PathBuf,
    mmap: MmapMut,
    present: Vec<bool>,
}

impl MmapBuffer {
    /// `size` must be the backend's known total size — this strategy
    /// requires it to size the backing sparse file up front.
    pub fn new(raw_fetch: RawFetch, size: u64, blocksize: u64) -> VfsResult<Self> {
        let path = unique_temp_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| VfsError::Backend(crate::FsError::Io {
                operation: "mmap_buffer_create",
                path: path.clone(),
                source: e,
            }))?;
        file.set_len(size.max(1)).map_err(|e| {
            VfsError::Backend(crate::FsError::Io {
                operation: "mmap_buffer_set_len",
                path: path.clone(),
                source: e,
            })
        })?;
        let mmap = unsafe {
            MmapMut::map_mut(&file).map_err(|e| {
                VfsError::Backend(crate::FsError::Io {
                    operation: "mmap_buffer_map",
                    path: path.clone(),
                    source: e,
                })
            })?
        };
        let num_blocks = size.div_ceil(blocksize.max(1)) as usize;
        Ok(Self {
            raw_fetch,
            blocksize: blocksize.max(1),
            size,
            path,
            mmap,
            present: vec![false; num_blocks],
        })
    }

    fn ensure_block(&mut self, block_idx: usize) -> VfsResult<()> {
        if self.present[block_idx] {
            return Ok(());
        }
        let start = block_idx as u64 * self.blocksize;
        let end = (start + self.blocksize).min(self.size);
        let data = (self.raw_fetch)(start, end)?;
        let dst = &mut self.mmap[start as usize..start as usize + data.len()];
        dst.copy_from_slice(&data);
        self.present[block_idx] = true;
        Ok(())
    }
}

impl ReadBuffer for MmapBuffer {
    fn fetch(&mut self, offset: u64, length: usize) -> VfsResult<Vec<u8>> {
        if length == 0 || offset >= self.size {
            return Ok(Vec::new());
        }
        let end = (offset + length as u64).min(self.size);
        let first_block = (offset / self.blocksize) as usize;
        let last_block = ((end.saturating_sub(1)) / self.blocksize) as usize;

        for block in first_block..=last_block {
            self.ensure_block(block)?;
        }

        Ok(self.mmap[offset as usize..end as usize].to_vec())
    }

    fn prefetch(&mut self, offset: u64, length: usize) {
        if length == 0 || offset >= self.size {
            return;
        }
        let end = (offset + length as u64).min(self.size);
        let first_block = (offset / self.blocksize) as usize;
        let last_block = ((end.saturating_sub(1)) / self.blocksize) as usize;
        for block in first_block..=last_block {
            let _ = self.ensure_block(block);
        }
    }

    fn close(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

impl Drop for MmapBuffer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
