//! Growing contiguous buffer, good for near-sequential access.

use crate::VfsResult;

use super::{RawFetch, ReadBuffer};

/// Accumulates fetched ranges into one growing buffer while access stays
/// contiguous; a non-contiguous request resets it to start fresh at the
/// new offset.
pub struct BytesBuffer {
    raw_fetch: RawFetch,
    start: u64,
    data: Vec<u8>,
}

impl BytesBuffer {
    /// An empty accumulator.
    pub fn new(raw_fetch: RawFetch) -> Self {
        Self {
            raw_fetch,
            start: 0,
            data: Vec::new(),
        }
    }

    fn end(&self) -> u64 {
        self.start + self.data.len() as u64
    }
}

impl ReadBuffer for BytesBuffer {
    fn fetch(&mut self, offset: u64, length: usize) -> VfsResult<Vec<u8>> {
        if length == 0 {
            return Ok(Vec::new());
        }

        let want_end = offset + length as u64;

        if self.data.is_empty() {
            self.start = offset;
            self.data = (self.raw_fetch)(offset, want_end)?;
        } else if offset == self.end() {
            // Contiguous extension: grow the buffer in place.
            let more = (self.raw_fetch)(self.end(), want_end)?;
            self.data.extend(more);
        } else if offset < self.start || offset > self.end() {
            // Non-contiguous: reset and refetch from scratch.
            self.start = offset;
            self.data = (self.raw_fetch)(offset, want_end)?;
        } else if want_end > self.end() {
            // Overlaps the tail; extend to cover the new request.
            let more = (self.raw_fetch)(self.end(), want_end)?;
            self.data.extend(more);
        }

        let rel_start = (offset.saturating_sub(self.start)) as usize;
        let rel_end = (rel_start + length).min(self.data.len());
        Ok(if rel_start >= self.data.len() {
            Vec::new()
        } else {
            self.data[rel_start..rel_end].to_vec()
        })
    }

    fn close(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_source(data: Vec<u8>, calls: Arc<AtomicUsize>) -> RawFetch {
        Arc::new(move |start, end| {
            calls.fetch_add(1, Ordering::SeqCst);
            let start = start as usize;
            let end = (end as usize).min(data.len());
            Ok(if start >= data.len() {
                Vec::new()
            } else {
                data[start..end].to_vec()
            })
        })
    }

    #[test]
    fn sequential_reads_extend_without_refetching_prefix() {
        let data: Vec<u8> = (0..50).collect();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut buf = BytesBuffer::new(counting_source(data.clone(), calls.clone()));

        assert_eq!(buf.fetch(0, 10).unwrap(), data[0..10]);
        assert_eq!(buf.fetch(10, 10).unwrap(), data[10..20]);
        assert_eq!(buf.fetch(0, 20).unwrap(), data[0..20]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn non_contiguous_jump_resets_buffer() {
        let data: Vec<u8> = (0..100).collect();
        let mut buf = BytesBuffer::new(counting_source(data.clone(), Arc::new(AtomicUsize::new(0))));
        buf.fetch(0, 5).unwrap();
        let got = buf.fetch(80, 5).unwrap();
        assert_eq!(got, data[80..85]);
    }
}
