//! Fixed-block LRU read cache.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::VfsResult;

use super::{RawFetch, ReadBuffer, DEFAULT_MAX_BLOCKS};

/// Fixed block size, LRU-evicted cache of blocks indexed `0..N`.
///
/// Thread-safe: the block map is behind a `Mutex` so a handle can be
/// shared with a background prefetcher (see [`BackgroundBlockBuffer`](super::BackgroundBlockBuffer)).
pub struct BlockLruBuffer {
    raw_fetch: RawFetch,
    blocksize: u64,
    blocks: Arc<Mutex<LruCache<u64, Vec<u8>>>>,
}

impl BlockLruBuffer {
    /// Build an LRU block cache holding at most `max_blocks` blocks of
    /// `blocksize` bytes each.
    pub fn new(raw_fetch: RawFetch, blocksize: u64, max_blocks: usize) -> Self {
        let cap = NonZeroUsize::new(max_blocks.max(1))
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_MAX_BLOCKS).unwrap());
        Self {
            raw_fetch,
            blocksize: blocksize.max(1),
            blocks: Arc::new(Mutex::new(LruCache::new(cap))),
        }
    }

    pub(super) fn blocksize(&self) -> u64 {
        self.blocksize
    }

    pub(super) fn blocks_handle(&self) -> Arc<Mutex<LruCache<u64, Vec<u8>>>> {
        self.blocks.clone()
    }

    pub(super) fn raw_fetch_handle(&self) -> RawFetch {
        self.raw_fetch.clone()
    }

    /// Fetch block `idx`, populating it from `raw_fetch` on a miss.
    /// Returns an empty vec for a block entirely past EOF.
    pub(super) fn fetch_block(
        raw_fetch: &RawFetch,
        blocks: &Mutex<LruCache<u64, Vec<u8>>>,
        blocksize: u64,
        idx: u64,
    ) -> VfsResult<Vec<u8>> {
        {
            let mut guard = blocks.lock().expect("block cache lock poisoned");
            if let Some(cached) = guard.get(&idx) {
                return Ok(cached.clone());
            }
        }
        let start = idx * blocksize;
        let data = raw_fetch(start, start + blocksize)?;
        let mut guard = blocks.lock().expect("block cache lock poisoned");
        guard.put(idx, data.clone());
        Ok(data)
    }

    /// Number of blocks currently populated.
    pub fn populated_blocks(&self) -> usize {
        self.blocks.lock().expect("block cache lock poisoned").len()
    }
}

impl ReadBuffer for BlockLruBuffer {
    fn fetch(&mut self, offset: u64, length: usize) -> VfsResult<Vec<u8>> {
        if length == 0 {
            return Ok(Vec::new());
        }
        let end = offset + length as u64;
        let first_block = offset / self.blocksize;
        let last_block = (end - 1) / self.blocksize;

        let mut out = Vec::with_capacity(length);
        for idx in first_block..=last_block {
            let block =
                Self::fetch_block(&self.raw_fetch, &self.blocks, self.blocksize, idx)?;
            if block.is_empty() {
                break; // past EOF: short read
            }
            let block_start = idx * self.blocksize;
            let rel_start = offset.max(block_start) - block_start;
            let rel_end = (end.min(block_start + self.blocksize) - block_start).min(block.len() as u64);
            if rel_start as usize >= block.len() {
                break;
            }
            out.extend_from_slice(&block[rel_start as usize..rel_end as usize]);
        }
        Ok(out)
    }

    fn close(&mut self) {
        self.blocks.lock().expect("block cache lock poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn source(data: Vec<u8>) -> RawFetch {
        Arc::new(move |start, end| {
            let start = (start as usize).min(data.len());
            let end = (end as usize).min(data.len());
            Ok(data[start..end].to_vec())
        })
    }

    #[test]
    fn fetch_across_two_blocks() {
        let data: Vec<u8> = (0..256u16).map(|n| (n % 256) as u8).collect();
        let mut buf = BlockLruBuffer::new(source(data.clone()), 64, 4);
        let got = buf.fetch(0, 70).unwrap();
        assert_eq!(got, data[0..70]);
        assert_eq!(buf.populated_blocks(), 2);
    }

    #[test]
    fn fetch_past_eof_short_reads() {
        let data: Vec<u8> = (0..10u8).collect();
        let mut buf = BlockLruBuffer::new(source(data.clone()), 64, 4);
        let got = buf.fetch(0, 100).unwrap();
        assert_eq!(got, data);
    }

    #[test]
    fn lru_evicts_oldest_block() {
        let data: Vec<u8> = (0..256u16).map(|n| (n % 256) as u8).collect();
        let mut buf = BlockLruBuffer::new(source(data), 64, 2);
        buf.fetch(0, 1).unwrap(); // block 0
        buf.fetch(64, 1).unwrap(); // block 1
        buf.fetch(128, 1).unwrap(); // block 2, evicts block 0
        assert_eq!(buf.populated_blocks(), 2);
    }
}
