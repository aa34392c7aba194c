//! Deferred-task queue modelling the UI scheduling checkpoint.
//!
//! Operations whose completion is asynchronous relative to their trigger
//! (surface teardown, external model propagation) enqueue work here.
//! Callers force completion with [`Scheduler::settle`] before asserting
//! state, instead of relying on an implicit digest cycle.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A unit of deferred work.
type Task = Box<dyn FnOnce() + Send>;

/// FIFO queue of deferred tasks, drained cooperatively.
///
/// Cloning yields a handle to the same queue.
#[derive(Clone, Default)]
pub struct Scheduler {
    queue: Arc<Mutex<VecDeque<Task>>>,
}

impl Scheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a task to run at the next checkpoint.
    pub fn defer(&self, task: impl FnOnce() + Send + 'static) {
        self.queue
            .lock()
            .expect("scheduler queue mutex poisoned")
            .push_back(Box::new(task));
    }

    /// Number of tasks currently queued.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .expect("scheduler queue mutex poisoned")
            .len()
    }

    /// Run a single queued task. Returns `false` when the queue is empty.
    ///
    /// The queue lock is not held while the task runs, so tasks may enqueue
    /// further tasks.
    pub fn tick(&self) -> bool {
        let task = self
            .queue
            .lock()
            .expect("scheduler queue mutex poisoned")
            .pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Drain the queue, including tasks enqueued while draining.
    ///
    /// Returns the number of tasks run.
    pub fn settle(&self) -> usize {
        let mut ran = 0;
        while self.tick() {
            ran += 1;
        }
        ran
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_defer_and_settle() {
        let scheduler = Scheduler::new();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let count = count.clone();
            scheduler.defer(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(scheduler.pending(), 3);
        assert_eq!(scheduler.settle(), 3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_tick_runs_one_task_in_order() {
        let scheduler = Scheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..2 {
            let log = log.clone();
            scheduler.defer(move || log.lock().unwrap().push(i));
        }

        assert!(scheduler.tick());
        assert_eq!(*log.lock().unwrap(), vec![0]);
        assert!(scheduler.tick());
        assert!(!scheduler.tick());
        assert_eq!(*log.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_settle_drains_tasks_enqueued_by_tasks() {
        let scheduler = Scheduler::new();
        let count = Arc::new(AtomicUsize::new(0));

        let inner_scheduler = scheduler.clone();
        let inner_count = count.clone();
        scheduler.defer(move || {
            let count = inner_count.clone();
            inner_scheduler.defer(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        });

        assert_eq!(scheduler.settle(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_settle_on_empty_queue() {
        assert_eq!(Scheduler::new().settle(), 0);
    }
}
