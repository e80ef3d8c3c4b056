//! Block LRU cache with speculative background prefetch of the next block.

use crate::VfsResult;

use super::block_lru::BlockLruBuffer;
use super::{RawFetch, ReadBuffer};

/// Same block math as [`BlockLruBuffer`]; after serving a block it
/// speculatively prefetches the following block on the async core's
/// worker pool. The prefetch never blocks the caller — a failure is
/// simply dropped, since it was only ever a head start.
pub struct BackgroundBlockBuffer {
    inner: BlockLruBuffer,
}

impl BackgroundBlockBuffer {
    /// Build with the same parameters as [`BlockLruBuffer::new`].
    pub fn new(raw_fetch: RawFetch, blocksize: u64, max_blocks: usize) -> Self {
        Self {
            inner: BlockLruBuffer::new(raw_fetch, blocksize, max_blocks),
        }
    }

    /// Number of blocks currently populated (delegates to the inner cache).
    pub fn populated_blocks(&self) -> usize {
        self.inner.populated_blocks()
    }

    fn spawn_prefetch(&self, next_block: u64) {
        let raw_fetch = self.inner.raw_fetch_handle();
        let blocks = self.inner.blocks_handle();
        let blocksize = self.inner.blocksize();

        crate::async_core::Loop::global().spawn_detached(move || {
            let _ = BlockLruBuffer::fetch_block(&raw_fetch, &blocks, blocksize, next_block);
        });
    }
}

impl ReadBuffer for BackgroundBlockBuffer {
    fn fetch(&mut self, offset: u64, length: usize) -> VfsResult<Vec<u8>> {
        let result = self.inner.fetch(offset, length)?;
        if length > 0 {
            let blocksize = self.inner.blocksize();
            let last_block_served = (offset + length as u64 - 1) / blocksize;
            self.spawn_prefetch(last_block_served + 1);
        }
        Ok(result)
    }

    fn prefetch(&mut self, offset: u64, length: usize) {
        self.inner.prefetch(offset, length);
    }

    fn close(&mut self) {
        self.inner.close();
    }
}
