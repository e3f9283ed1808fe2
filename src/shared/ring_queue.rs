//! Growable circular buffer with FIFO-ordered indexed access.

use std::ops::{Index, IndexMut};

/// Initial capacity used by [`RingQueue::new`].
pub const DEFAULT_CAPACITY: usize = 8;

/// Array-backed FIFO queue.
///
/// Pushes at the tail and pops at the head in O(1), doubling its storage when
/// full. Logical index 0 is always the head, whatever the physical layout.
#[derive(Debug, Clone)]
pub struct RingQueue<T> {
    buf: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T> RingQueue<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a queue able to hold `capacity` items before growing (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    fn physical(&self, index: usize) -> usize {
        (self.head + index) % self.buf.len()
    }

    /// Appends at the tail, doubling the storage first if the queue is full.
    pub fn enqueue(&mut self, item: T) {
        if self.len == self.buf.len() {
            self.grow();
        }
        let tail = self.physical(self.len);
        self.buf[tail] = Some(item);
        self.len += 1;
    }

    /// Removes and returns the head, or `None` when the queue is empty.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let item = self.buf[self.head].take();
        self.head = (self.head + 1) % self.buf.len();
        self.len -= 1;
        item
    }

    pub fn peek(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Element at logical position `index` (0 = head).
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.buf[self.physical(index)].as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let slot = self.physical(index);
        self.buf[slot].as_mut()
    }

    pub fn clear(&mut self) {
        for slot in &mut self.buf {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Iterates from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |i| self.buf[self.physical(i)].as_ref())
    }

    /// Re-lays the items in logical order at the start of a buffer twice as large.
    fn grow(&mut self) {
        let new_capacity = self.buf.len() * 2;
        let mut buf: Vec<Option<T>> = Vec::with_capacity(new_capacity);
        for i in 0..self.len {
            let slot = self.physical(i);
            buf.push(self.buf[slot].take());
        }
        buf.resize_with(new_capacity, || None);
        self.buf = buf;
        self.head = 0;
    }
}

impl<T> Default for RingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for RingQueue<T> {
    type Output = T;

    /// Panics when `index >= len()`.
    fn index(&self, index: usize) -> &T {
        let len = self.len;
        match self.get(index) {
            Some(item) => item,
            None => panic!("RingQueue index {index} out of range (len {len})"),
        }
    }
}

impl<T> IndexMut<usize> for RingQueue<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(item) => item,
            None => panic!("RingQueue index {index} out of range (len {len})"),
        }
    }
}
