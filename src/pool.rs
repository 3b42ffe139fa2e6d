//! A fixed-size worker pool draining a bounded task queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::warn;

use crate::queue::BoundedQueue;
use crate::sync::Latch;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Default depth of the task queue.
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

struct Shared {
    tasks: BoundedQueue<Task>,
    stop: AtomicBool,
}

/// A group of worker threads executing submitted tasks in FIFO order.
///
/// Each task runs exactly once. Dropping the pool drains the queue: the
/// destructor first submits one gate task per worker, each parking its
/// worker on a shared latch, then raises the stop flag and counts the
/// latch down. Every worker therefore observes the stop after finishing
/// its in-flight task, drains whatever is still queued, and exits; no task
/// is ever abandoned.
pub struct TaskPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl TaskPool {
    /// Spawns `workers` threads with the default queue depth.
    pub fn new(workers: usize) -> Self {
        Self::with_queue_depth(workers, DEFAULT_QUEUE_DEPTH)
    }

    pub fn with_queue_depth(workers: usize, depth: usize) -> Self {
        assert!(workers > 0, "a pool needs at least one worker");
        let shared = Arc::new(Shared {
            tasks: BoundedQueue::new(depth),
            stop: AtomicBool::new(false),
        });
        let workers = (0..workers)
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("aig-worker-{}", i))
                    .spawn(move || process_tasks(&shared))
                    .expect("failed to spawn worker thread")
            })
            .collect();
        Self { shared, workers }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Submits a task, blocking until the queue accepts it.
    ///
    /// While the queue is full the caller runs queued tasks itself, so a
    /// task submitting further tasks from a worker thread cannot deadlock
    /// against the bounded queue.
    pub fn submit(&self, task: impl FnOnce() + Send + 'static) {
        let mut task: Task = Box::new(task);
        loop {
            match self.shared.tasks.try_enqueue(task) {
                Ok(()) => return,
                Err(rejected) => {
                    task = rejected;
                    self.make_progress();
                }
            }
        }
    }

    /// Runs one queued task on the calling thread, if any is ready.
    pub fn make_progress(&self) {
        if let Some(task) = self.shared.tasks.try_dequeue() {
            task();
        }
    }
}

fn process_tasks(shared: &Shared) {
    while !shared.stop.load(Ordering::Acquire) {
        (shared.tasks.dequeue())();
    }

    // Stop requested: drain the remainder without blocking.
    while let Some(task) = shared.tasks.try_dequeue() {
        task();
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        let gate = Arc::new(Latch::new(self.workers.len() + 1));
        for _ in 0..self.workers.len() {
            let gate = Arc::clone(&gate);
            self.submit(move || gate.arrive_and_wait());
        }

        self.shared.stop.store(true, Ordering::Release);
        gate.count_down();

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("worker thread panicked during shutdown");
            }
        }
    }
}
