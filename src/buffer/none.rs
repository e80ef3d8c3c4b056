//! Passthrough buffer — every fetch goes straight to the backend.

use crate::VfsResult;

use super::{RawFetch, ReadBuffer};

/// No caching at all; every `fetch` calls `raw_fetch` directly.
pub struct NoneBuffer {
    raw_fetch: RawFetch,
}

impl NoneBuffer {
    /// Wrap `raw_fetch` with no caching behavior.
    pub fn new(raw_fetch: RawFetch) -> Self {
        Self { raw_fetch }
    }
}

impl ReadBuffer for NoneBuffer {
    fn fetch(&mut self, offset: u64, length: usize) -> VfsResult<Vec<u8>> {
        if length == 0 {
            return Ok(Vec::new());
        }
        (self.raw_fetch)(offset, offset + length as u64)
    }
}
