//! Single contiguous read-ahead window, good for forward scans.

use crate::VfsResult;

use super::{RawFetch, ReadBuffer};

/// Keeps exactly one contiguous `[start, end)` window. A request outside
/// the window refetches `[offset, offset + max(length, blocksize))`.
pub struct ReadAheadBuffer {
    raw_fetch: RawFetch,
    blocksize: u64,
    window: Option<(u64, Vec<u8>)>,
}

impl ReadAheadBuffer {
    /// Build a window buffer with the given minimum refetch size.
    pub fn new(raw_fetch: RawFetch, blocksize: u64) -> Self {
        Self {
            raw_fetch,
            blocksize,
            window: None,
        }
    }

    fn covers(window: &(u64, Vec<u8>), offset: u64, length: usize) -> bool {
        let (start, data) = window;
        let end = start + data.len() as u64;
        offset >= *start && offset + length as u64 <= end
    }
}

impl ReadBuffer for ReadAheadBuffer {
    fn fetch(&mut self, offset: u64, length: usize) -> VfsResult<Vec<u8>> {
        if length == 0 {
            return Ok(Vec::new());
        }

        let needs_refetch = match &self.window {
            Some(w) => !Self::covers(w, offset, length),
            None => true,
        };

        if needs_refetch {
            let want = length as u64;
            let fetch_len = want.max(self.blocksize);
            let data = (self.raw_fetch)(offset, offset + fetch_len)?;
            self.window = Some((offset, data));
        }

        let (start, data) = self.window.as_ref().expect("window just populated");
        let rel_start = (offset - start) as usize;
        let rel_end = (rel_start + length).min(data.len());
        Ok(if rel_start >= data.len() {
            Vec::new()
        } else {
            data[rel_start..rel_end].to_vec()
        })
    }

    fn close(&mut self) {
        self.window = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn source(data: Vec<u8>) -> RawFetch {
        Arc::new(move |start, end| {
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
    fn fetch_within_blocksize_is_one_call() {
        let data: Vec<u8> = (0..100).collect();
        let mut buf = ReadAheadBuffer::new(source(data.clone()), 16);
        assert_eq!(buf.fetch(0, 10).unwrap(), data[0..10]);
        assert_eq!(buf.fetch(4, 8).unwrap(), data[4..12]);
    }

    #[test]
    fn fetch_short_reads_past_eof() {
        let data: Vec<u8> = (0..10).collect();
        let mut buf = ReadAheadBuffer::new(source(data.clone()), 4);
        let got = buf.fetch(8, 10).unwrap();
        assert_eq!(got, data[8..10]);
    }

    #[test]
    fn empty_range_never_calls_backend() {
        let mut buf = ReadAheadBuffer::new(
            Arc::new(|_, _| panic!("should not be called")),
            16,
        );
        assert_eq!(buf.fetch(0, 0).unwrap(), Vec::<u8>::new());
    }
}
