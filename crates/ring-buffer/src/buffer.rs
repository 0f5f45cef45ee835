//! Ring Buffer Implementation

use crate::BufferError;

/// Default buffer capacity (100 samples, a few seconds of video)
pub const DEFAULT_CAPACITY: usize = 100;

/// Fixed-capacity ring buffer; the oldest entry is evicted when full
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Pre-allocated slots
    storage: Box<[Option<T>]>,
    /// Index of the oldest element
    head: usize,
    /// Number of live elements
    len: usize,
    /// Total items ever pushed (for statistics)
    total_written: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with given capacity
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        let storage: Vec<Option<T>> = (0..capacity).map(|_| None).collect();
        Ok(Self {
            storage: storage.into_boxed_slice(),
            head: 0,
            len: 0,
            total_written: 0,
        })
    }

    /// Push an item, returning the evicted oldest item if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let capacity = self.capacity();
        self.total_written += 1;

        if self.len < capacity {
            let idx = (self.head + self.len) % capacity;
            self.storage[idx] = Some(item);
            self.len += 1;
            None
        } else {
            let evicted = self.storage[self.head].replace(item);
            self.head = (self.head + 1) % capacity;
            evicted
        }
    }

    /// Number of items currently held
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Get fill ratio (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let capacity = self.capacity();
        (0..self.len).filter_map(move |i| self.storage[(self.head + i) % capacity].as_ref())
    }

    /// Most recently pushed item
    pub fn latest(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        let idx = (self.head + self.len - 1) % self.capacity();
        self.storage[idx].as_ref()
    }

    /// Get total items written (for statistics)
    pub fn total_written(&self) -> usize {
        self.total_written
    }

    /// Drop every item, keeping the allocation
    pub fn clear(&mut self) {
        for slot in self.storage.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Read the last N items (most recent first)
    pub fn read_last(&self, count: usize) -> Vec<T> {
        let skip = self.len.saturating_sub(count);
        let mut items: Vec<T> = self.iter().skip(skip).cloned().collect();
        items.reverse();
        items
    }

    /// Copy out all items in insertion order
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}
