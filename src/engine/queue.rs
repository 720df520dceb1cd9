//! FIFO waiting list used for pairing.

use alloc::collections::VecDeque;

/// Waiting ids in arrival order. An id is held at most once.
#[derive(Debug, Clone)]
pub struct MatchQueue<T> {
    waiting: VecDeque<T>,
}

impl<T: PartialEq> MatchQueue<T> {
    pub fn new() -> Self {
        Self {
            waiting: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.waiting.contains(value)
    }

    /// Append to the tail. Returns `false` and leaves the queue unchanged if
    /// `value` is already waiting.
    pub fn enqueue(&mut self, value: T) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.waiting.push_back(value);
        true
    }

    /// Remove and return the longest-waiting entry.
    pub fn dequeue(&mut self) -> Option<T> {
        self.waiting.pop_front()
    }

    /// Drop `value` from wherever it sits. Returns whether it was present.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.waiting.iter().position(|v| v == value) {
            Some(idx) => {
                self.waiting.remove(idx);
                true
            }
            None => false,
        }
    }
}

impl<T: PartialEq> Default for MatchQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
