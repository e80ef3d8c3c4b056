//! # Buffered File
//!
//! A polymorphic byte stream with two modes: a cache-backed read stream
//! built on [`ReadBuffer`](crate::buffer::ReadBuffer), and a write-mode
//! block accumulator that hands completed blocks off to an FS-supplied
//! chunked-upload protocol, falling back to a single-shot write for small
//! files.

use std::sync::{Arc, Weak};

use crate::buffer::{RawFetch, ReadBuffer};
use crate::{Fs, VfsError, VfsResult};

/// Lifecycle state of a [`BufferedFile`].
///
/// `Closed` and `Failed` are terminal — every operation on a file in
/// either state returns [`VfsError::Backend`] wrapping a fresh error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Open for reading.
    OpenRead,
    /// Open for writing.
    OpenWrite,
    /// `close()` in progress (flushing the tail block).
    Closing,
    /// Closed cleanly.
    Closed,
    /// Aborted, or a prior operation failed unrecoverably.
    Failed,
}

/// Opaque handle returned by a backend's `initiate_upload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadHandle(pub u64);

/// Begins a chunked upload, returning a handle threaded through subsequent
/// `upload_chunk`/`cancel_upload` calls.
pub type InitiateUpload = Arc<dyn Fn() -> VfsResult<UploadHandle> + Send + Sync>;
/// Uploads one completed block; `final_chunk` is set on the last call.
pub type UploadChunk =
    Arc<dyn Fn(UploadHandle, u64, &[u8], bool) -> VfsResult<()> + Send + Sync>;
/// Aborts an in-progress chunked upload; no `pipe_file` fallback follows.
pub type CancelUpload = Arc<dyn Fn(UploadHandle) -> VfsResult<()> + Send + Sync>;
/// Single-shot whole-file write, used when the file never reached one
/// full block.
pub type PipeFile = Arc<dyn Fn(&[u8]) -> VfsResult<()> + Send + Sync>;

const DEFAULT_WRITE_BLOCK_SIZE: u64 = 5 * 1024 * 1024;

fn closed_error() -> VfsError {
    VfsError::Backend(crate::FsError::NotSupported {
        operation: "operation on a closed BufferedFile",
    })
}

fn invalid_range() -> VfsError {
    VfsError::InvalidRange {
        path: std::path::PathBuf::new(),
        start: 0,
        end: None,
    }
}

enum Mode {
    Read {
        buffer: Box<dyn ReadBuffer>,
        position: u64,
        size: Option<u64>,
    },
    Write {
        blocksize: u64,
        pending: Vec<u8>,
        block_index: u64,
        upload_handle: Option<UploadHandle>,
        initiate_upload: InitiateUpload,
        upload_chunk: UploadChunk,
        cancel_upload: CancelUpload,
        pipe_file: PipeFile,
    },
}

/// A single open file, in either read or write mode.
pub struct BufferedFile {
    mode: Mode,
    state: FileState,
    owner: Weak<dyn Fs>,
}

impl BufferedFile {
    /// Open a read-mode file over `buffer`, which wraps the backend's
    /// `raw_fetch` with whichever [`crate::buffer::BufferStrategy`] the
    /// caller selected. `size`, when cheaply known, enables EOF-relative
    /// reads and reads-to-end without a probe.
    pub fn open_read(owner: Weak<dyn Fs>, buffer: Box<dyn ReadBuffer>, size: Option<u64>) -> Self {
        Self {
            mode: Mode::Read {
                buffer,
                position: 0,
                size,
            },
            state: FileState::OpenRead,
            owner,
        }
    }

    /// Open a write-mode file accumulating blocks of `blocksize` bytes
    /// (falling back to [`DEFAULT_WRITE_BLOCK_SIZE`] when `None`).
    pub fn open_write(
        owner: Weak<dyn Fs>,
        blocksize: Option<u64>,
        initiate_upload: InitiateUpload,
        upload_chunk: UploadChunk,
        cancel_upload: CancelUpload,
        pipe_file: PipeFile,
    ) -> Self {
        Self {
            mode: Mode::Write {
                blocksize: blocksize.unwrap_or(DEFAULT_WRITE_BLOCK_SIZE).max(1),
                pending: Vec::new(),
                block_index: 0,
                upload_handle: None,
                initiate_upload,
                upload_chunk,
                cancel_upload,
                pipe_file,
            },
            state: FileState::OpenWrite,
            owner,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> FileState {
        self.state
    }

    /// The FS this file was opened against, if it's still alive. Held as
    /// a weak reference so an open file never keeps its FS from being
    /// dropped.
    pub fn owner(&self) -> Option<Arc<dyn Fs>> {
        self.owner.upgrade()
    }

    fn check_open(&self, expected: FileState) -> VfsResult<()> {
        if self.state != expected {
            return Err(closed_error());
        }
        Ok(())
    }

    /// Read up to `n` bytes (or to EOF if `n` is `None`), advancing the
    /// cursor. Never errors on a short read past EOF.
    pub fn read(&mut self, n: Option<usize>) -> VfsResult<Vec<u8>> {
        self.check_open(FileState::OpenRead)?;
        let Mode::Read {
            buffer,
            position,
            size,
        } = &mut self.mode
        else {
            unreachable!("read() only valid in read mode")
        };

        let length = match n {
            Some(n) => n,
            None => match size {
                Some(total) => total.saturating_sub(*position) as usize,
                None => {
                    // Unknown size: grow in chunks until a short read signals EOF.
                    let mut out = Vec::new();
                    loop {
                        let chunk = buffer.fetch(*position, 64 * 1024)?;
                        let got = chunk.len();
                        out.extend_from_slice(&chunk);
                        *position += got as u64;
                        if got < 64 * 1024 {
                            break;
                        }
                    }
                    return Ok(out);
                }
            },
        };

        let data = buffer.fetch(*position, length)?;
        *position += data.len() as u64;
        Ok(data)
    }

    /// Read exactly `buf.len()` bytes or fewer at EOF, returning the count.
    pub fn read_into(&mut self, buf: &mut [u8]) -> VfsResult<usize> {
        let data = self.read(Some(buf.len()))?;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    /// Current read cursor. Seeks never touch the backend.
    pub fn tell(&self) -> u64 {
        match &self.mode {
            Mode::Read { position, .. } => *position,
            Mode::Write { .. } => 0,
        }
    }

    /// Move the read cursor. `offset` is relative to the start of the
    /// file (`whence = 0`), the current position (`whence = 1`), or the
    /// end (`whence = 2`, requires a known size).
    pub fn seek(&mut self, offset: i64, whence: i32) -> VfsResult<u64> {
        self.check_open(FileState::OpenRead)?;
        let Mode::Read { position, size, .. } = &mut self.mode else {
            unreachable!("seek() only valid in read mode")
        };
        let base = match whence {
            0 => 0,
            1 => *position as i64,
            2 => size.ok_or_else(invalid_range)? as i64,
            _ => return Err(invalid_range()),
        };
        let target = base + offset;
        if target < 0 {
            return Err(invalid_range());
        }
        *position = target as u64;
        Ok(*position)
    }

    /// Append `data` to the pending block accumulator, flushing any
    /// completed blocks through the chunked-upload protocol.
    pub fn write(&mut self, data: &[u8]) -> VfsResult<()> {
        self.check_open(FileState::OpenWrite)?;
        let Mode::Write {
            blocksize,
            pending,
            block_index,
            upload_handle,
            initiate_upload,
            upload_chunk,
            ..
        } = &mut self.mode
        else {
            unreachable!("write() only valid in write mode")
        };

        pending.extend_from_slice(data);

        while pending.len() as u64 >= *blocksize {
            if upload_handle.is_none() {
                *upload_handle = Some(initiate_upload()?);
            }
            let block: Vec<u8> = pending.drain(..*blocksize as usize).collect();
            upload_chunk(upload_handle.expect("just set"), *block_index, &block, false)?;
            *block_index += 1;
        }
        Ok(())
    }

    /// Permitted only while nothing has been uploaded yet (file still
    /// smaller than one block) — resizes the pending buffer directly.
    pub fn truncate(&mut self, size: u64) -> VfsResult<()> {
        self.check_open(FileState::OpenWrite)?;
        let Mode::Write {
            pending,
            upload_handle,
            ..
        } = &mut self.mode
        else {
            unreachable!("truncate() only valid in write mode")
        };
        if upload_handle.is_some() {
            return Err(VfsError::Backend(crate::FsError::NotSupported {
                operation: "truncate after a chunked upload has started",
            }));
        }
        pending.resize(size as usize, 0);
        Ok(())
    }

    /// Flush the tail block (or take the single-shot `pipe_file` path if
    /// the file never reached a full block) and transition to `Closed`.
    pub fn close(&mut self) -> VfsResult<()> {
        match self.state {
            FileState::Closed | FileState::Failed => return Ok(()),
            _ => {}
        }
        self.state = FileState::Closing;

        let result = match &mut self.mode {
            Mode::Read { .. } => Ok(()),
            Mode::Write {
                pending,
                block_index,
                upload_handle,
                upload_chunk,
                pipe_file,
                ..
            } => match upload_handle {
                Some(handle) => upload_chunk(*handle, *block_index, pending, true),
                None => pipe_file(pending),
            },
        };

        self.state = if result.is_ok() {
            FileState::Closed
        } else {
            FileState::Failed
        };
        result
    }

    /// Abort a write in progress: cancels any open upload and never runs
    /// the `pipe_file` fallback.
    pub fn abort(&mut self) -> VfsResult<()> {
        if let Mode::Write {
            upload_handle: Some(handle),
            cancel_upload,
            ..
        } = &self.mode
        {
            cancel_upload(*handle)?;
        }
        self.state = FileState::Failed;
        Ok(())
    }
}

impl Drop for BufferedFile {
    fn drop(&mut self) {
        if matches!(self.state, FileState::OpenRead | FileState::OpenWrite) {
            let _ = self.close();
        }
    }
}

/// Wire a [`RawFetch`] and a chosen strategy together, matching the shape
/// [`crate::open`] and [`crate::vfs::VfsExt::open`] build for callers.
///
/// `size`, when known, sizes [`crate::buffer::MmapBuffer`]'s backing sparse
/// file up front — [`BufferStrategy::Mmap`] requires it and errors rather
/// than silently falling back to a different strategy when it's absent.
pub fn read_buffer_from_strategy(
    strategy: crate::buffer::BufferStrategy,
    raw_fetch: RawFetch,
    blocksize: u64,
    max_blocks: usize,
    size: Option<u64>,
) -> VfsResult<Box<dyn ReadBuffer>> {
    use crate::buffer::*;
    Ok(match strategy {
        BufferStrategy::ReadAhead => Box::new(ReadAheadBuffer::new(raw_fetch, blocksize)),
        BufferStrategy::Bytes => Box::new(BytesBuffer::new(raw_fetch)),
        BufferStrategy::Mmap => {
            let size = size.ok_or_else(|| {
                VfsError::Backend(crate::FsError::NotSupported {
                    operation: "mmap read-buffer strategy requires a known file size",
                })
            })?;
            Box::new(MmapBuffer::new(raw_fetch, size, blocksize)?)
        }
        BufferStrategy::Block => Box::new(BlockLruBuffer::new(raw_fetch, blocksize, max_blocks)),
        BufferStrategy::BackgroundBlock => {
            Box::new(BackgroundBlockBuffer::new(raw_fetch, blocksize, max_blocks))
        }
        BufferStrategy::FirstChunk => Box::new(FirstChunkBuffer::new(raw_fetch, blocksize)),
        BufferStrategy::None => Box::new(NoneBuffer::new(raw_fetch)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::NoneBuffer;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    fn no_owner() -> Weak<dyn Fs> {
        let weak: Weak<dyn Fs> = Weak::<crate::backends::MemoryFs>::new();
        weak
    }

    #[test]
    fn read_mode_advances_cursor() {
        let data = b"hello world".to_vec();
        let fetch: RawFetch = Arc::new(move |start, end| {
            let start = (start as usize).min(data.len());
            let end = (end as usize).min(data.len());
            Ok(data[start..end].to_vec())
        });
        let mut file = BufferedFile::open_read(
            no_owner(),
            Box::new(NoneBuffer::new(fetch)),
            Some(11),
        );
        let chunk = file.read(Some(5)).unwrap();
        assert_eq!(chunk, b"hello");
        assert_eq!(file.tell(), 5);
        let rest = file.read(None).unwrap();
        assert_eq!(rest, b" world");
    }

    #[test]
    fn seek_does_not_touch_backend() {
        let calls = Arc::new(AtomicBool::new(false));
        let calls2 = calls.clone();
        let fetch: RawFetch = Arc::new(move |_, _| {
            calls2.store(true, Ordering::SeqCst);
            Ok(vec![0u8; 4])
        });
        let mut file =
            BufferedFile::open_read(no_owner(), Box::new(NoneBuffer::new(fetch)), Some(100));
        file.seek(10, 0).unwrap();
        assert_eq!(file.tell(), 10);
        assert!(!calls.load(Ordering::SeqCst));
    }

    #[test]
    fn small_write_uses_pipe_file_fallback() {
        let committed: Arc<Mutex<Option<Vec<u8>>>> = Arc::new(Mutex::new(None));
        let committed2 = committed.clone();
        let mut file = BufferedFile::open_write(
            no_owner(),
            Some(1024),
            Arc::new(|| panic!("initiate_upload should not run for a sub-block write")),
            Arc::new(|_, _, _, _| panic!("upload_chunk should not run")),
            Arc::new(|_| panic!("cancel_upload should not run")),
            Arc::new(move |bytes| {
                *committed2.lock().unwrap() = Some(bytes.to_vec());
                Ok(())
            }),
        );
        file.write(b"small file").unwrap();
        file.close().unwrap();
        assert_eq!(committed.lock().unwrap().as_deref(), Some(&b"small file"[..]));
        assert_eq!(file.state(), FileState::Closed);
    }

    #[test]
    fn multi_block_write_uses_chunked_upload() {
        let chunks: Arc<Mutex<Vec<(u64, Vec<u8>, bool)>>> = Arc::new(Mutex::new(Vec::new()));
        let chunks2 = chunks.clone();
        let mut file = BufferedFile::open_write(
            no_owner(),
            Some(4),
            Arc::new(|| Ok(UploadHandle(1))),
            Arc::new(move |_, idx, bytes, final_chunk| {
                chunks2.lock().unwrap().push((idx, bytes.to_vec(), final_chunk));
                Ok(())
            }),
            Arc::new(|_| panic!("cancel_upload should not run on clean close")),
            Arc::new(|_| panic!("pipe_file should not run once chunked upload started")),
        );
        file.write(b"abcdefgh").unwrap(); // two full 4-byte blocks
        file.write(b"xy").unwrap(); // tail
        file.close().unwrap();

        let recorded = chunks.lock().unwrap();
        assert_eq!(recorded.len(), 3);
        assert_eq!(recorded[0], (0, b"abcd".to_vec(), false));
        assert_eq!(recorded[1], (1, b"efgh".to_vec(), false));
        assert_eq!(recorded[2], (2, b"xy".to_vec(), true));
    }

    #[test]
    fn abort_cancels_upload_and_skips_fallback() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled2 = cancelled.clone();
        let mut file = BufferedFile::open_write(
            no_owner(),
            Some(4),
            Arc::new(|| Ok(UploadHandle(7))),
            Arc::new(|_, _, _, _| Ok(())),
            Arc::new(move |_| {
                cancelled2.store(true, Ordering::SeqCst);
                Ok(())
            }),
            Arc::new(|_| panic!("pipe_file should not run on abort")),
        );
        file.write(b"abcd").unwrap();
        file.abort().unwrap();
        assert!(cancelled.load(Ordering::SeqCst));
        assert_eq!(file.state(), FileState::Failed);
    }

    #[test]
    fn mmap_strategy_constructs_a_real_mmap_buffer() {
        let data = b"hello mmap world".to_vec();
        let fetch: RawFetch = Arc::new(move |start, end| {
            let start = (start as usize).min(data.len());
            let end = (end as usize).min(data.len());
            Ok(data[start..end].to_vec())
        });
        let mut buffer = read_buffer_from_strategy(
            crate::buffer::BufferStrategy::Mmap,
            fetch,
            crate::buffer::DEFAULT_BLOCK_SIZE,
            crate::buffer::DEFAULT_MAX_BLOCKS,
            Some(17),
        )
        .unwrap();
        assert_eq!(buffer.fetch(0, 5).unwrap(), b"hello");
    }

    #[test]
    fn mmap_strategy_without_known_size_errors_instead_of_downgrading() {
        let fetch: RawFetch = Arc::new(|_, _| Ok(Vec::new()));
        let err = read_buffer_from_strategy(
            crate::buffer::BufferStrategy::Mmap,
            fetch,
            crate::buffer::DEFAULT_BLOCK_SIZE,
            crate::buffer::DEFAULT_MAX_BLOCKS,
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            VfsError::Backend(crate::FsError::NotSupported { .. })
        ));
    }

    #[test]
    fn use_after_close_errors() {
        let mut file = BufferedFile::open_read(
            no_owner(),
            Box::new(NoneBuffer::new(Arc::new(|_, _| Ok(Vec::new())))),
            Some(0),
        );
        file.close().unwrap();
        assert!(file.read(Some(1)).is_err());
    }
}
