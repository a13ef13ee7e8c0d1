// Stateless Decode Harness - Display Queue
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Fixed-capacity ring of decode-order indices waiting for presentation.
// Filled by the GOP scheduler, drained by the pipeline driver.

use crate::error::QueueError;

/// Capacity used by the harness. Presets are validated against it at startup.
pub const DISPLAY_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct DisplayQueue {
    entries: Box<[usize]>,
    start: usize,
    count: usize,
}

impl DisplayQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![0; capacity].into_boxed_slice(),
            start: 0,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.entries.len()
    }

    /// Append `index` at the tail. Never overwrites.
    pub fn enqueue(&mut self, index: usize) -> Result<(), QueueError> {
        if self.is_full() {
            return Err(QueueError::QueueFull);
        }
        let tail = (self.start + self.count) % self.entries.len();
        self.entries[tail] = index;
        self.count += 1;
        Ok(())
    }

    /// Remove and return the head.
    pub fn dequeue(&mut self) -> Result<usize, QueueError> {
        let head = self.peek()?;
        self.start = (self.start + 1) % self.entries.len();
        self.count -= 1;
        Ok(head)
    }

    pub fn peek(&self) -> Result<usize, QueueError> {
        if self.count == 0 {
            return Err(QueueError::QueueEmpty);
        }
        Ok(self.entries[self.start])
    }

    pub fn clear(&mut self) {
        self.start = 0;
        self.count = 0;
    }

    /// Pending entries, head first.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.count).map(move |i| self.entries[(self.start + i) % self.entries.len()])
    }
}

impl Default for DisplayQueue {
    fn default() -> Self {
        Self::new(DISPLAY_QUEUE_CAPACITY)
    }
}
