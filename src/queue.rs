//! A bounded multi-producer multi-consumer FIFO.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::sync::Semaphore;

/// FIFO of bounded depth with counting-semaphore backpressure.
///
/// `enqueue` blocks while the queue is full and `dequeue` blocks while it
/// is empty; the `try_` variants never block. The internal queue mutation
/// is a short critical section; the semaphores account for items and free
/// slots, so a successful acquire always corresponds to an element (or a
/// slot) being present.
pub struct BoundedQueue<T> {
    items: Mutex<VecDeque<T>>,
    items_produced: Semaphore,
    remaining_space: Semaphore,
}

impl<T> BoundedQueue<T> {
    pub fn new(depth: usize) -> Self {
        assert!(depth > 0, "queue depth must be positive");
        Self {
            items: Mutex::new(VecDeque::with_capacity(depth)),
            items_produced: Semaphore::new(0),
            remaining_space: Semaphore::new(depth),
        }
    }

    /// Appends `value`, blocking while the queue is full.
    pub fn enqueue(&self, value: T) {
        self.remaining_space.acquire();
        self.push(value);
        self.items_produced.release();
    }

    /// Appends `value` if a slot is immediately available; otherwise hands
    /// the value back to the caller.
    pub fn try_enqueue(&self, value: T) -> Result<(), T> {
        if !self.remaining_space.try_acquire() {
            return Err(value);
        }
        self.push(value);
        self.items_produced.release();
        Ok(())
    }

    /// Removes the oldest element, blocking while the queue is empty.
    pub fn dequeue(&self) -> T {
        self.items_produced.acquire();
        let value = self.pop();
        self.remaining_space.release();
        value
    }

    /// Removes the oldest element if one is immediately available.
    pub fn try_dequeue(&self) -> Option<T> {
        if !self.items_produced.try_acquire() {
            return None;
        }
        let value = self.pop();
        self.remaining_space.release();
        Some(value)
    }

    fn push(&self, value: T) {
        self.items.lock().unwrap().push_back(value);
    }

    fn pop(&self) -> T {
        self.items
            .lock()
            .unwrap()
            .pop_front()
            .expect("acquired semaphore guarantees a queued item")
    }
}
