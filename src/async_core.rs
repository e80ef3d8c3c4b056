//! # Async Core
//!
//! One dedicated OS thread hosts a current-thread `tokio` runtime (the
//! "I/O loop") — grounded in the `tokio` runtime pattern used throughout
//! the pack's async-capable backends. Non-loop threads bridge into it via
//! [`Loop::sync`]; bulk operations batch through [`run_coros_in_chunks`].

use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::{VfsError, VfsResult};

/// Default concurrency cap for network-bound bulk operations (`spec.md` §6
/// `gather_batch_size`).
pub const DEFAULT_GATHER_BATCH_SIZE: usize = 128;

/// Default concurrency cap for operations that open local file descriptors
/// (`spec.md` §6 `nofiles_gather_batch_size`).
pub const DEFAULT_NOFILES_GATHER_BATCH_SIZE: usize = 8;

static GLOBAL_LOOP: OnceLock<Loop> = OnceLock::new();

/// The dedicated I/O thread and a handle into its runtime.
pub struct Loop {
    handle: tokio::runtime::Handle,
    thread_id: std::thread::ThreadId,
}

impl Loop {
    /// The process-wide I/O loop, created lazily on first access.
    pub fn global() -> &'static Loop {
        GLOBAL_LOOP.get_or_init(Loop::spawn)
    }

    fn spawn() -> Loop {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::Builder::new()
            .name("anyfs-io-loop".to_string())
            .spawn(move || {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("anyfs: failed to build I/O loop runtime");
                let handle = rt.handle().clone();
                let _ = tx.send((handle, std::thread::current().id()));
                // Park the runtime here for the rest of the process's
                // life; spawned tasks are driven while this resolves.
                rt.block_on(futures::future::pending::<()>());
            })
            .expect("anyfs: failed to spawn I/O loop thread");

        let (handle, thread_id) = rx.recv().expect("anyfs: I/O loop thread failed to start");
        Loop { handle, thread_id }
    }

    /// The loop's `tokio` runtime handle, for spawning work directly.
    pub fn handle(&self) -> &tokio::runtime::Handle {
        &self.handle
    }

    /// `true` if called from the loop's own OS thread.
    pub fn is_loop_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Run `f` on the loop's blocking-task pool without waiting for it —
    /// used for speculative work like [`BackgroundBlockBuffer`](crate::buffer::BackgroundBlockBuffer)'s prefetch.
    pub fn spawn_detached<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.spawn_blocking(f);
    }

    /// Schedule `future` on the loop and block the calling thread until it
    /// resolves or `timeout` elapses.
    ///
    /// # Panics
    ///
    /// Panics if called from the loop's own thread — bridging into a loop
    /// from itself would deadlock, so this fails fast instead (`spec.md`
    /// §9 "Coroutine control flow").
    pub fn sync<F>(&self, future: F, timeout: Option<Duration>) -> VfsResult<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        assert!(
            !self.is_loop_thread(),
            "anyfs: sync() called from inside the I/O loop thread"
        );

        let (tx, rx) = std::sync::mpsc::channel();
        self.handle.spawn(async move {
            let result = future.await;
            let _ = tx.send(result);
        });

        match timeout {
            Some(d) => rx.recv_timeout(d).map_err(|_| VfsError::Timeout),
            None => rx.recv().map_err(|_| VfsError::Cancelled),
        }
    }
}

/// Bridge a non-loop caller into the global [`Loop`].
///
/// Shorthand for `Loop::global().sync(future, timeout)`.
pub fn sync<F>(future: F, timeout: Option<Duration>) -> VfsResult<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    Loop::global().sync(future, timeout)
}

/// Run `coros` with at most `batch_size` in flight at once, preserving the
/// input ordering of results (`spec.md` §5 "Ordering guarantees": bulk
/// calls preserve per-path result order even though execution overlaps).
pub async fn run_coros_in_chunks<T, Fut, I>(coros: I, batch_size: usize) -> Vec<VfsResult<T>>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = VfsResult<T>> + Send + 'static,
    T: Send + 'static,
{
    stream::iter(coros)
        .buffered(batch_size.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_bridges_a_future_to_completion() {
        let result = sync(async { 2 + 2 }, None).unwrap();
        assert_eq!(result, 4);
    }

    #[test]
    fn sync_times_out() {
        let result = sync(
            async {
                tokio::time::sleep(Duration::from_secs(10)).await;
            },
            Some(Duration::from_millis(20)),
        );
        assert!(matches!(result, Err(VfsError::Timeout)));
    }

    #[test]
    #[should_panic(expected = "sync() called from inside the I/O loop thread")]
    fn sync_inside_loop_panics() {
        let l = Loop::global();
        l.sync(
            async {
                let l = Loop::global();
                let _ = l.sync(async { 1 }, None);
            },
            None,
        )
        .unwrap();
    }

    #[test]
    fn run_coros_in_chunks_preserves_order() {
        let coros: Vec<_> = (0..10)
            .map(|i| {
                Box::pin(async move {
                    if i % 2 == 0 {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                    }
                    Ok::<i32, VfsError>(i)
                }) as std::pin::Pin<Box<dyn Future<Output = VfsResult<i32>> + Send>>
            })
            .collect();

        let results = sync(run_coros_in_chunks(coros, 4), None).unwrap();
        let values: Vec<i32> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, (0..10).collect::<Vec<_>>());
    }
}
