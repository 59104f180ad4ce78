//! Preallocated buffers that carry query records from the IO thread to the UI.
//!
//! The completion callback fills a buffer before depositing its result; the UI
//! reads it after taking the result. The mutex makes that ordering explicit and
//! is never contended in practice.

use parking_lot::Mutex;
use shared::ledger::{Account, Transfer};

pub const MAX_ACCOUNTS: usize = 128;
pub const MAX_TRANSFERS: usize = 256;

/// Bounded, allocate-once record buffer.
#[derive(Debug)]
pub struct StagingBuffer<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T: Copy> StagingBuffer<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Replace the contents with up to `capacity` items, returning how many were staged.
    pub fn fill<I: IntoIterator<Item = T>>(&mut self, items: I) -> usize {
        self.items.clear();
        self.items.extend(items.into_iter().take(self.capacity));
        self.items.len()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[derive(Debug)]
pub struct Staging {
    pub accounts: Mutex<StagingBuffer<Account>>,
    pub transfers: Mutex<StagingBuffer<Transfer>>,
}

impl Staging {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(StagingBuffer::with_capacity(MAX_ACCOUNTS)),
            transfers: Mutex::new(StagingBuffer::with_capacity(MAX_TRANSFERS)),
        }
    }

    pub fn clear(&self) {
        self.accounts.lock().clear();
        self.transfers.lock().clear();
    }
}

impl Default for Staging {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_caps_at_capacity() {
        let mut buffer = StagingBuffer::with_capacity(3);
        let staged = buffer.fill(1..=5u32);
        assert_eq!(staged, 3);
        assert_eq!(buffer.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_fill_does_not_grow_allocation() {
        let mut buffer = StagingBuffer::with_capacity(MAX_ACCOUNTS);
        let before = buffer.items.capacity();
        buffer.fill((0..1000u128).map(|id| Account::new(id, 1, 1)));
        assert_eq!(buffer.len(), MAX_ACCOUNTS);
        assert_eq!(buffer.items.capacity(), before);
    }

    #[test]
    fn test_fill_replaces_previous_contents() {
        let mut buffer = StagingBuffer::with_capacity(4);
        buffer.fill([1u8, 2, 3]);
        buffer.fill(std::iter::empty());
        assert!(buffer.is_empty());
    }
}
