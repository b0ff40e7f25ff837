//! The worker pool running per-paint preparation off the caller thread.
//!
//! The pool is process-wide and sized once at [`crate::init`]. Work is
//! submitted as closures; each submission returns a [`TaskHandle`] whose
//! `join` is the only synchronization primitive the engine relies on:
//! after `join` returns, every write the task made is visible to the
//! caller. A task is "working" exactly while its handle is unjoined.
//! Submitted tasks always run to completion; there is no cancellation.
//!
//! With a pool size of zero, submission degrades to inline execution on
//! the caller thread and handles are born joined.

use std::sync::Mutex;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed pool of worker threads draining a FIFO queue.
pub(crate) struct Pool {
    tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl Pool {
    pub(crate) fn new(threads: usize) -> Self {
        let (tx, rx) = unbounded::<Job>();
        let workers = (0..threads)
            .map(|tid| {
                let rx: Receiver<Job> = rx.clone();
                std::thread::Builder::new()
                    .name(format!("lienzo-worker-{tid}"))
                    .spawn(move || {
                        while let Ok(job) = rx.recv() {
                            job();
                        }
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();
        Self {
            tx: Some(tx),
            workers,
        }
    }

    pub(crate) fn request(&self, job: Job) {
        if let Some(tx) = &self.tx {
            // The channel only closes at shutdown, when no producer is left.
            let _ = tx.send(job);
        }
    }

    /// Closes the queue and joins every worker.
    pub(crate) fn shutdown(mut self) {
        self.tx.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

/// The result slot of a submitted task.
///
/// `join` blocks until the task has run and then yields its output; once
/// joined, further calls are free. A handle created with [`TaskHandle::ready`]
/// was executed inline and never blocks.
pub(crate) struct TaskHandle<T> {
    rx: Option<Receiver<T>>,
    value: Option<T>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn ready(value: T) -> Self {
        Self {
            rx: None,
            value: Some(value),
        }
    }

    /// Whether the task may still be running on a worker.
    pub(crate) fn is_working(&self) -> bool {
        self.rx.is_some()
    }

    /// Barrier: returns once the task has completed. Yields `None` only
    /// if the worker died before delivering a result.
    pub(crate) fn join(&mut self) -> Option<&mut T> {
        if let Some(rx) = self.rx.take() {
            match rx.recv() {
                Ok(value) => self.value = Some(value),
                Err(_) => debug!("prepare task vanished before joining"),
            }
        }
        self.value.as_mut()
    }

    pub(crate) fn into_value(mut self) -> Option<T> {
        self.join();
        self.value
    }
}

// ── Global pool ──────────────────────────────────────────────────────────

static POOL: Mutex<Option<Pool>> = Mutex::new(None);

/// Builds the pool. `threads == 0` keeps execution inline.
pub(crate) fn start(threads: usize) {
    let mut pool = POOL.lock().unwrap_or_else(|e| e.into_inner());
    if threads > 0 && pool.is_none() {
        debug!(threads, "starting scheduler pool");
        *pool = Some(Pool::new(threads));
    }
}

/// Joins all workers and drops the pool.
pub(crate) fn stop() {
    let pool = POOL.lock().unwrap_or_else(|e| e.into_inner()).take();
    if let Some(pool) = pool {
        pool.shutdown();
    }
}

pub(crate) fn threads() -> usize {
    POOL.lock()
        .unwrap_or_else(|e| e.into_inner())
        .as_ref()
        .map(|p| p.workers.len())
        .unwrap_or(0)
}

/// Submits `f` for execution. Cheap enough to call per paint: with a pool
/// it clones one channel sender and enqueues; without one it runs inline.
pub(crate) fn execute<T, F>(f: F) -> TaskHandle<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let sender = POOL
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .as_ref()
        .and_then(|p| p.tx.clone());
    match sender {
        Some(tx_pool) => {
            let (tx, rx) = bounded(1);
            let job: Job = Box::new(move || {
                let _ = tx.send(f());
            });
            let _ = tx_pool.send(job);
            TaskHandle {
                rx: Some(rx),
                value: None,
            }
        }
        None => TaskHandle::ready(f()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn inline_handles_are_born_joined() {
        let mut handle = TaskHandle::ready(41 + 1);
        assert!(!handle.is_working());
        assert_eq!(handle.join(), Some(&mut 42));
    }

    #[test]
    fn join_is_a_visibility_barrier() {
        let pool = Pool::new(2);
        let mut handles = Vec::new();
        for i in 0..32usize {
            let (tx, rx) = bounded(1);
            let slot = Arc::new(AtomicUsize::new(0));
            let task_slot = Arc::clone(&slot);
            pool.request(Box::new(move || {
                task_slot.store(i + 1, Ordering::Relaxed);
                let _ = tx.send(());
            }));
            handles.push((
                TaskHandle::<()> {
                    rx: Some(rx),
                    value: None,
                },
                slot,
                i,
            ));
        }
        for (mut handle, slot, i) in handles {
            assert!(handle.is_working());
            handle.join();
            // Everything the task wrote is visible after join.
            assert_eq!(slot.load(Ordering::Relaxed), i + 1);
        }
        pool.shutdown();
    }

    #[test]
    fn shutdown_runs_queued_tasks_to_completion() {
        let pool = Pool::new(1);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..16 {
            let counter = Arc::clone(&counter);
            pool.request(Box::new(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            }));
        }
        pool.shutdown();
        assert_eq!(counter.load(Ordering::Relaxed), 16);
    }
}
