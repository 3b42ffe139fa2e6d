//! Blocking building blocks for the task queue and the worker pool.
//!
//! Nothing here is aware of the graph: the cut engine itself never blocks,
//! so sleeping waits only happen inside these primitives.

use std::sync::{Condvar, Mutex};

/// A counting semaphore.
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Blocks until a permit is available, then takes it.
    pub fn acquire(&self) {
        let mut permits = self.permits.lock().unwrap();
        while *permits == 0 {
            permits = self.available.wait(permits).unwrap();
        }
        *permits -= 1;
    }

    /// Takes a permit if one is immediately available.
    pub fn try_acquire(&self) -> bool {
        let mut permits = self.permits.lock().unwrap();
        if *permits == 0 {
            return false;
        }
        *permits -= 1;
        true
    }

    /// Returns a permit and wakes one waiter.
    pub fn release(&self) {
        let mut permits = self.permits.lock().unwrap();
        *permits += 1;
        drop(permits);
        self.available.notify_one();
    }
}

/// A single-use countdown gate.
///
/// Counts down from an initial value; waiters are released when the count
/// reaches zero. Unlike a barrier, counting down and waiting are separate
/// operations, so a controller can release waiters without joining them.
pub struct Latch {
    count: Mutex<usize>,
    released: Condvar,
}

impl Latch {
    pub fn new(count: usize) -> Self {
        Self {
            count: Mutex::new(count),
            released: Condvar::new(),
        }
    }

    /// Decrements the count, waking all waiters when it reaches zero.
    pub fn count_down(&self) {
        let mut count = self.count.lock().unwrap();
        assert!(*count > 0, "latch counted down past zero");
        *count -= 1;
        if *count == 0 {
            self.released.notify_all();
        }
    }

    /// Blocks until the count reaches zero.
    pub fn wait(&self) {
        let mut count = self.count.lock().unwrap();
        while *count > 0 {
            count = self.released.wait(count).unwrap();
        }
    }

    /// Decrements and then waits for the remaining arrivals.
    pub fn arrive_and_wait(&self) {
        self.count_down();
        self.wait();
    }
}
