//! # Transactions
//!
//! A per-FS, single-threaded queue of deferred finalizers. `start` opens the
//! queue, `complete` runs it in insertion order stopping on first failure,
//! `cancel` drops it and aborts each in-flight upload. Commit is
//! best-effort: on a backend that cannot undo partial uploads, `complete`
//! reports the finalized-so-far subset rather than pretending to roll back
//! (see `DESIGN.md`).
//!
//! Cross-FS atomicity is out of scope — a `Transaction` belongs to exactly
//! one backend.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::{VfsError, VfsResult};

/// A deferred finalizer: commits one path, returning that path on success.
type Finalizer = Box<dyn FnOnce() -> Result<PathBuf, VfsError> + Send>;
/// Called for each not-yet-finalized entry when a transaction is cancelled.
type Aborter = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Active,
    Committing,
    Aborted,
}

struct Pending {
    finalize: Finalizer,
    abort: Aborter,
}

/// A single-FS transaction. Backends that choose to defer writes (instead
/// of committing them immediately) push a [`Pending`] entry via
/// [`Transaction::defer`]; callers that never defer can still use `start`/
/// `complete` as a no-op bracket.
pub struct Transaction {
    state: Mutex<State>,
    queue: Mutex<VecDeque<Pending>>,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    /// A transaction with an empty, idle queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::Idle),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// `true` if a transaction is currently active.
    pub fn is_active(&self) -> bool {
        *self.state.lock().unwrap() == State::Active
    }

    /// Open the queue. No-op if already active.
    pub fn start(&self) {
        let mut state = self.state.lock().unwrap();
        if *state != State::Active {
            *state = State::Active;
            self.queue.lock().unwrap().clear();
        }
    }

    /// Append a deferred write. Only meaningful while active; backends
    /// that don't defer never call this.
    pub fn defer<F, A>(&self, finalize: F, abort: A)
    where
        F: FnOnce() -> Result<PathBuf, VfsError> + Send + 'static,
        A: FnOnce() + Send + 'static,
    {
        self.queue.lock().unwrap().push_back(Pending {
            finalize: Box::new(finalize),
            abort: Box::new(abort),
        });
    }

    /// Run the queue in insertion order. Stops at the first failure and
    /// returns [`VfsError::TransactionAborted`] carrying the paths that
    /// did finalize; the FS is left `idle` either way.
    pub fn complete(&self) -> VfsResult<Vec<PathBuf>> {
        *self.state.lock().unwrap() = State::Committing;
        let mut queue = self.queue.lock().unwrap();
        let mut finalized = Vec::with_capacity(queue.len());
        while let Some(entry) = queue.pop_front() {
            match (entry.finalize)() {
                Ok(path) => finalized.push(path),
                Err(e) => {
                    // Best-effort: abort everything still queued, leave what
                    // already landed as-is (undoing it is not guaranteed to
                    // be possible on the backend).
                    for remaining in queue.drain(..) {
                        (remaining.abort)();
                    }
                    *self.state.lock().unwrap() = State::Idle;
                    return Err(VfsError::TransactionAborted {
                        finalized,
                        source: Box::new(e),
                    });
                }
            }
        }
        *self.state.lock().unwrap() = State::Idle;
        Ok(finalized)
    }

    /// Drop the queue, aborting every entry's in-flight upload.
    pub fn cancel(&self) {
        let mut queue = self.queue.lock().unwrap();
        for entry in queue.drain(..) {
            (entry.abort)();
        }
        *self.state.lock().unwrap() = State::Aborted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn start_then_complete_runs_queue_in_order() {
        let txn = Transaction::new();
        txn.start();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = order.clone();
            txn.defer(
                move || {
                    order.lock().unwrap().push(i);
                    Ok(PathBuf::from(format!("/p{i}")))
                },
                || {},
            );
        }
        let finalized = txn.complete().unwrap();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(
            finalized,
            vec![PathBuf::from("/p0"), PathBuf::from("/p1"), PathBuf::from("/p2")]
        );
    }

    #[test]
    fn complete_stops_on_first_failure_and_reports_finalized_subset() {
        let txn = Transaction::new();
        txn.start();
        txn.defer(|| Ok(PathBuf::from("/ok")), || {});
        txn.defer(
            || {
                Err(VfsError::Backend(crate::FsError::NotSupported {
                    operation: "simulated failure",
                }))
            },
            || {},
        );
        let aborted = Arc::new(AtomicUsize::new(0));
        let flag = aborted.clone();
        txn.defer(|| Ok(PathBuf::from("/never")), move || {
            flag.fetch_add(1, Ordering::SeqCst);
        });

        let err = txn.complete().unwrap_err();
        match err {
            VfsError::TransactionAborted { finalized, .. } => {
                assert_eq!(finalized, vec![PathBuf::from("/ok")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(aborted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_aborts_every_queued_entry() {
        let txn = Transaction::new();
        txn.start();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let count = count.clone();
            txn.defer(|| Ok(PathBuf::from("/x")), move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        txn.cancel();
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!txn.is_active());
    }

    #[test]
    fn complete_with_empty_queue_succeeds() {
        let txn = Transaction::new();
        txn.start();
        assert_eq!(txn.complete().unwrap(), Vec::<PathBuf>::new());
    }
}
