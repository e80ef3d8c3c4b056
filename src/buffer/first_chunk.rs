//! Caches only the first block — typically format headers.

use crate::VfsResult;

use super::{RawFetch, ReadBuffer};

/// Trivial strategy: caches block 0 only. Any read touching block 0 is
/// served from the cached copy; reads elsewhere always hit `raw_fetch`.
pub struct FirstChunkBuffer {
    raw_fetch: RawFetch,
    blocksize: u64,
    first_block: Option<Vec<u8>>,
}

impl FirstChunkBuffer {
    /// `blocksize` bytes of block 0 are cached on first access.
    pub fn new(raw_fetch: RawFetch, blocksize: u64) -> Self {
        Self {
            raw_fetch,
            blocksize: blocksize.max(1),
            first_block: None,
        }
    }
}

impl ReadBuffer for FirstChunkBuffer {
    fn fetch(&mut self, offset: u64, length: usize) -> VfsResult<Vec<u8>> {
        if length == 0 {
            return Ok(Vec::new());
        }
        let end = offset + length as u64;
        if end <= self.blocksize {
            if self.first_block.is_none() {
                self.first_block = Some((self.raw_fetch)(0, self.blocksize)?);
            }
            let block = self.first_block.as_ref().expect("just populated");
            let start = (offset as usize).min(block.len());
            let end = (end as usize).min(block.len());
            return Ok(block[start..end].to_vec());
        }
        (self.raw_fetch)(offset, end)
    }

    fn close(&mut self) {
        self.first_block = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn repeated_header_reads_hit_cache_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        let data: Vec<u8> = (0..100u8).collect();
        let fetch: RawFetch = Arc::new(move |start, end| {
            calls2.fetch_add(1, Ordering::SeqCst);
            let start = start as usize;
            let end = (end as usize).min(data.len());
            Ok(data[start..end].to_vec())
        });
        let mut buf = FirstChunkBuffer::new(fetch, 16);
        buf.fetch(0, 8).unwrap();
        buf.fetch(4, 4).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reads_outside_first_block_bypass_cache() {
        let data: Vec<u8> = (0..100u8).collect();
        let fetch: RawFetch = Arc::new(move |start, end| {
            let start = start as usize;
            let end = (end as usize).min(data.len());
            Ok(data[start..end].to_vec())
        });
        let mut buf = FirstChunkBuffer::new(fetch, 16);
        let got = buf.fetch(50, 10).unwrap();
        assert_eq!(got.len(), 10);
    }
}
