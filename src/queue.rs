//! Serial execution contexts for event delivery.
//!
//! An [`EventQueue`] is a worker thread draining a channel of jobs. Jobs
//! submitted through one handle (or any clone of it) run in submission
//! order with no overlap, which is all the serialization the watchers
//! need. The thread exits when every handle has been dropped.

use std::sync::OnceLock;
use std::thread;

use crossbeam_channel::{Sender, unbounded};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A serial execution context backed by one worker thread.
#[derive(Clone)]
pub struct EventQueue {
    tx: Sender<Job>,
}

impl EventQueue {
    /// Spawn a new queue with its own worker thread.
    pub fn new() -> EventQueue {
        let (tx, rx) = unbounded::<Job>();
        thread::spawn(move || {
            for job in rx {
                job();
            }
        });
        EventQueue { tx }
    }

    /// The shared background queue used as the default delivery context
    /// for single-path watchers.
    pub fn background() -> EventQueue {
        static BACKGROUND: OnceLock<EventQueue> = OnceLock::new();
        BACKGROUND.get_or_init(EventQueue::new).clone()
    }

    /// Submit a job. Jobs run in submission order on the worker thread.
    ///
    /// Submitting to a queue whose worker has exited is a silent no-op;
    /// that only happens during process teardown.
    pub fn execute(&self, job: impl FnOnce() + Send + 'static) {
        let _ = self.tx.send(Box::new(job));
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        EventQueue::new()
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_jobs_run_in_submission_order() {
        let queue = EventQueue::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let (done_tx, done_rx) = crossbeam_channel::bounded(0);

        for i in 0..16 {
            let seen = Arc::clone(&seen);
            queue.execute(move || seen.lock().push(i));
        }
        queue.execute(move || {
            let _ = done_tx.send(());
        });

        done_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();
        assert_eq!(*seen.lock(), (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_clones_share_one_worker() {
        let queue = EventQueue::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let (done_tx, done_rx) = crossbeam_channel::bounded(0);

        for _ in 0..8 {
            let clone = queue.clone();
            let counter = Arc::clone(&counter);
            clone.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        queue.execute(move || {
            let _ = done_tx.send(());
        });

        done_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }
}
