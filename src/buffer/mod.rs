//! # Read-Buffer Strategies
//!
//! A family of byte-range cachers front-ending a cold, backend-supplied
//! `raw_fetch(start, end) -> bytes`. Every strategy implements the single
//! [`ReadBuffer`] primitive `fetch(offset, length)`; callers never see
//! `raw_fetch` directly once a strategy wraps it.
//!
//! Shared edge cases (`spec.md` §4.5): a request past end-of-file returns a
//! short read, never an error; negative offsets require a known size;
//! empty ranges return empty bytes without touching the backend.

mod background_block;
mod block_lru;
mod bytes_buf;
mod first_chunk;
mod mmap;
mod none;
mod read_ahead;

pub use background_block::BackgroundBlockBuffer;
pub use block_lru::BlockLruBuffer;
pub use bytes_buf::BytesBuffer;
pub use first_chunk::FirstChunkBuffer;
pub use mmap::MmapBuffer;
pub use none::NoneBuffer;
pub use read_ahead::ReadAheadBuffer;

use std::sync::Arc;

use crate::VfsResult;

/// A cold, backend-supplied byte-range fetcher: `raw_fetch(start, end)`.
///
/// Every strategy wraps one of these; it is the only thing that actually
/// touches the backend.
pub type RawFetch = Arc<dyn Fn(u64, u64) -> VfsResult<Vec<u8>> + Send + Sync>;

/// Default block size used by block-oriented strategies (64 KiB).
pub const DEFAULT_BLOCK_SIZE: u64 = 64 * 1024;

/// Default number of blocks an LRU-backed strategy retains.
pub const DEFAULT_MAX_BLOCKS: usize = 64;

/// Common interface implemented by every read-buffer strategy.
pub trait ReadBuffer: Send {
    /// Fetch `length` bytes starting at `offset`.
    ///
    /// Returns fewer than `length` bytes (never an error) when the
    /// request runs past the end of the underlying data.
    fn fetch(&mut self, offset: u64, length: usize) -> VfsResult<Vec<u8>>;

    /// Hint that `[offset, offset+length)` will likely be read soon.
    /// Default is a no-op; strategies that benefit override it.
    fn prefetch(&mut self, _offset: u64, _length: usize) {}

    /// Release any resources held (temp files, background tasks).
    fn close(&mut self) {}
}

/// Resolve a possibly-negative offset (`-n` meaning "n bytes from EOF")
/// against a known or unknown total size.
pub(crate) fn resolve_offset(offset: i64, size: Option<u64>) -> VfsResult<u64> {
    if offset >= 0 {
        return Ok(offset as u64);
    }
    let size = size.ok_or_else(|| {
        crate::VfsError::InvalidRange {
            path: std::path::PathBuf::new(),
            start: offset,
            end: None,
        }
    })?;
    let from_end = (-offset) as u64;
    Ok(size.saturating_sub(from_end))
}

/// Which named strategy a `cache_type` config string selects
/// (`spec.md` §6 `cache_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferStrategy {
    /// [`ReadAheadBuffer`].
    ReadAhead,
    /// [`BytesBuffer`].
    Bytes,
    /// [`MmapBuffer`].
    Mmap,
    /// [`BlockLruBuffer`].
    #[default]
    Block,
    /// [`BackgroundBlockBuffer`].
    BackgroundBlock,
    /// [`FirstChunkBuffer`].
    FirstChunk,
    /// [`NoneBuffer`].
    None,
}

impl std::str::FromStr for BufferStrategy {
    type Err = crate::VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "readahead" | "read_ahead" => Ok(Self::ReadAhead),
            "bytes" => Ok(Self::Bytes),
            "mmap" => Ok(Self::Mmap),
            "block" => Ok(Self::Block),
            "background_block" => Ok(Self::BackgroundBlock),
            "first_chunk" | "firstchunk" => Ok(Self::FirstChunk),
            "none" => Ok(Self::None),
            other => Err(crate::VfsError::InvalidPath {
                path: other.into(),
                reason: "unknown cache_type".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_offset_passes_through_non_negative() {
        assert_eq!(resolve_offset(10, None).unwrap(), 10);
    }

    #[test]
    fn resolve_offset_requires_size_when_negative() {
        assert!(resolve_offset(-5, None).is_err());
    }

    #[test]
    fn resolve_offset_computes_from_end() {
        assert_eq!(resolve_offset(-5, Some(100)).unwrap(), 95);
    }

    #[test]
    fn buffer_strategy_parses_known_names() {
        assert_eq!(
            "block".parse::<BufferStrategy>().unwrap(),
            BufferStrategy::Block
        );
        assert_eq!(
            "mmap".parse::<BufferStrategy>().unwrap(),
            BufferStrategy::Mmap
        );
        assert!("bogus".parse::<BufferStrategy>().is_err());
    }
}
