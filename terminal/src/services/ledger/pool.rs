//! # Request Pool
//!
//! Fixed set of [`RequestSlot`]s, allocated once and reused for the life of the
//! process. Each slot carries its own payload buffer, so submitting a request
//! never allocates.
//!
//! Ownership is tracked with one `AtomicBool` per slot. The UI thread acquires
//! slots; the client's IO thread releases them from the completion callback.
//! A slot's memory is only ever touched by whoever holds its flag.

use std::cell::UnsafeCell;
use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use thiserror::Error;

use super::ffi::{RequestSlot, SLOT_PAYLOAD_BYTES};

/// Default number of outstanding low-level requests.
pub const DEFAULT_POOL_CAPACITY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("Pointer does not belong to this pool")]
    ForeignPointer,

    #[error("Pointer is inside the pool but not on a slot boundary")]
    Misaligned,

    #[error("Slot {0} is not in use")]
    NotInUse(usize),
}

#[repr(C, align(16))]
struct Payload([u8; SLOT_PAYLOAD_BYTES]);

/// Slot header first, so a slot pointer is also a cell pointer.
#[repr(C)]
struct SlotCell {
    slot: UnsafeCell<RequestSlot>,
    payload: UnsafeCell<Payload>,
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub capacity: usize,
    pub in_use: usize,
    pub available: usize,
}

pub struct RequestPool {
    cells: Box<[SlotCell]>,
    in_use: Box<[AtomicBool]>,
    cursor: AtomicUsize,
}

// SAFETY: a cell is only accessed by the holder of its `in_use` flag, and the
// flag hand-off uses Acquire/Release so the holder sees the previous writes.
unsafe impl Sync for RequestPool {}
unsafe impl Send for RequestPool {}

impl RequestPool {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let cells = (0..capacity)
            .map(|_| SlotCell {
                slot: UnsafeCell::new(RequestSlot::empty()),
                payload: UnsafeCell::new(Payload([0; SLOT_PAYLOAD_BYTES])),
            })
            .collect();
        let in_use = (0..capacity).map(|_| AtomicBool::new(false)).collect();

        Self {
            cells,
            in_use,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Claim a free slot, or `None` when every slot is in flight.
    ///
    /// Scans at most `capacity` slots starting from a rotating cursor and never blocks.
    pub fn acquire(&self) -> Option<SlotGuard<'_>> {
        let capacity = self.capacity();
        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % capacity;

        for offset in 0..capacity {
            let index = (start + offset) % capacity;
            if self.in_use[index]
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                // SAFETY: the CAS above made us the sole owner of this cell.
                unsafe { (*self.cells[index].slot.get()).reset() };
                return Some(SlotGuard { pool: self, index });
            }
        }

        tracing::trace!(capacity, "Request pool exhausted");
        None
    }

    /// Return a submitted slot to the pool.
    ///
    /// `ptr` must be a slot previously handed out by [`SlotGuard::into_raw`].
    pub fn release(&self, ptr: *mut RequestSlot) -> Result<usize, PoolError> {
        let index = self.index_of(ptr)?;
        self.release_index(index)?;
        Ok(index)
    }

    pub fn stats(&self) -> PoolStats {
        let in_use = self
            .in_use
            .iter()
            .filter(|flag| flag.load(Ordering::Relaxed))
            .count();
        PoolStats {
            capacity: self.capacity(),
            in_use,
            available: self.capacity() - in_use,
        }
    }

    fn index_of(&self, ptr: *mut RequestSlot) -> Result<usize, PoolError> {
        let base = self.cells.as_ptr() as usize;
        let stride = std::mem::size_of::<SlotCell>();
        let addr = ptr as usize;

        if addr < base || addr >= base + stride * self.capacity() {
            return Err(PoolError::ForeignPointer);
        }
        let offset = addr - base;
        if offset % stride != 0 {
            return Err(PoolError::Misaligned);
        }
        Ok(offset / stride)
    }

    fn release_index(&self, index: usize) -> Result<(), PoolError> {
        if !self.in_use[index].load(Ordering::Acquire) {
            return Err(PoolError::NotInUse(index));
        }
        // SAFETY: the flag is still set, so the releasing caller owns the cell.
        unsafe { (*self.cells[index].slot.get()).reset() };
        self.in_use[index].store(false, Ordering::Release);
        Ok(())
    }
}

impl std::fmt::Debug for RequestPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPool").field("stats", &self.stats()).finish()
    }
}

/// Exclusive claim on one slot. Releases the slot on drop unless submitted.
pub struct SlotGuard<'a> {
    pool: &'a RequestPool,
    index: usize,
}

impl SlotGuard<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// The slot's payload buffer.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        // SAFETY: the guard owns the cell; the borrow is tied to `&mut self`.
        unsafe { &mut (*self.pool.cells[self.index].payload.get()).0 }
    }

    /// Fill in the header for a request whose payload is the first `len` bytes of the buffer.
    pub fn set_request(&mut self, operation: u8, user_tag: u16, sequence: u32, len: usize) {
        let cell = &self.pool.cells[self.index];
        let len = len.min(SLOT_PAYLOAD_BYTES);
        // SAFETY: the guard owns the cell.
        let slot = unsafe { &mut *cell.slot.get() };
        slot.user_data = sequence as usize as *mut c_void;
        slot.data = cell.payload.get() as *const c_void;
        slot.data_size = len as u32;
        slot.user_tag = user_tag;
        slot.operation = operation;
        slot.status = 0;
    }

    /// Hand the slot over to the client. It stays claimed until [`RequestPool::release`].
    pub fn into_raw(self) -> *mut RequestSlot {
        let ptr = self.pool.cells[self.index].slot.get();
        std::mem::forget(self);
        ptr
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.pool.release_index(self.index) {
            tracing::error!(error = %err, "Slot guard released an unclaimed slot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_up_to_capacity_then_backpressure() {
        let pool = RequestPool::new(DEFAULT_POOL_CAPACITY);
        let mut held = Vec::new();
        for _ in 0..DEFAULT_POOL_CAPACITY {
            held.push(pool.acquire().expect("slot available").into_raw());
        }

        assert!(pool.acquire().is_none());
        assert_eq!(
            pool.stats(),
            PoolStats {
                capacity: 8,
                in_use: 8,
                available: 0
            }
        );

        pool.release(held.pop().unwrap()).unwrap();
        let reacquired = pool.acquire().expect("released slot available").into_raw();
        assert!(pool.acquire().is_none());
        held.push(reacquired);
        assert_eq!(pool.stats().in_use, 8);
    }

    #[test]
    fn test_slots_are_distinct_and_stable() {
        let pool = RequestPool::new(4);
        let a = pool.acquire().unwrap().into_raw();
        let b = pool.acquire().unwrap().into_raw();
        assert_ne!(a, b);

        let index = pool.release(a).unwrap();
        // same backing storage comes back after release
        let again = loop {
            let guard = pool.acquire().unwrap();
            if guard.index() == index {
                break guard.into_raw();
            }
        };
        assert_eq!(again, a);
    }

    #[test]
    fn test_guard_drop_releases() {
        let pool = RequestPool::new(2);
        {
            let _guard = pool.acquire().unwrap();
            assert_eq!(pool.stats().in_use, 1);
        }
        assert_eq!(pool.stats().available, 2);
    }

    #[test]
    fn test_release_validates_pointer() {
        let pool = RequestPool::new(2);
        let mut outside = RequestSlot::empty();
        assert_eq!(pool.release(&mut outside), Err(PoolError::ForeignPointer));

        let slot = pool.acquire().unwrap().into_raw();
        let inside = (slot as usize + 8) as *mut RequestSlot;
        assert_eq!(pool.release(inside), Err(PoolError::Misaligned));

        let index = pool.release(slot).unwrap();
        assert_eq!(pool.release(slot), Err(PoolError::NotInUse(index)));
    }

    #[test]
    fn test_set_request_points_at_owned_payload() {
        let pool = RequestPool::new(1);
        let mut guard = pool.acquire().unwrap();
        guard.payload_mut()[..4].copy_from_slice(&[1, 2, 3, 4]);
        guard.set_request(135, 1, 77, 64);
        let ptr = guard.into_raw();

        // SAFETY: test holds the slot exclusively.
        let slot = unsafe { &*ptr };
        assert_eq!(slot.sequence(), 77);
        assert_eq!(slot.data_size, 64);
        assert_eq!(slot.operation, 135);
        assert_eq!(slot.data as usize % 16, 0);
        let payload = unsafe { std::slice::from_raw_parts(slot.data as *const u8, 4) };
        assert_eq!(payload, &[1, 2, 3, 4]);

        pool.release(ptr).unwrap();
        assert!(unsafe { (*ptr).data.is_null() });
    }

    #[test]
    fn test_concurrent_release_from_other_thread() {
        let pool = std::sync::Arc::new(RequestPool::new(8));
        let ptrs: Vec<usize> = (0..8)
            .map(|_| pool.acquire().unwrap().into_raw() as usize)
            .collect();

        let worker = {
            let pool = pool.clone();
            std::thread::spawn(move || {
                for ptr in ptrs {
                    pool.release(ptr as *mut RequestSlot).unwrap();
                }
            })
        };
        worker.join().unwrap();
        assert_eq!(pool.stats().available, 8);
    }
}
