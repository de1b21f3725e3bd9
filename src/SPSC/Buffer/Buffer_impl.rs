use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};
use std::sync::Arc;

use crossbeam_utils::CachePadded;

use super::Buffer::{BoundedRing, RingConsumer, RingProducer};
use crate::Core::error::{PipelineError, Result};

impl<T: Copy + Default> BoundedRing<T> {
    /// Allocate a ring of `capacity` slots and split it into its two handles.
    ///
    /// Fails with [`PipelineError::InvalidCapacity`] unless `capacity` is a
    /// non-zero power of two.
    pub fn split(capacity: usize) -> Result<(RingProducer<T>, RingConsumer<T>)> {
        if capacity == 0 || (capacity & (capacity - 1)) != 0 {
            return Err(PipelineError::InvalidCapacity { capacity });
        }

        let slots: Box<[UnsafeCell<T>]> = (0..capacity)
            .map(|_| UnsafeCell::new(T::default()))
            .collect();

        let ring = Arc::new(BoundedRing {
            write: CachePadded::new(AtomicUsize::new(0)),
            read: CachePadded::new(AtomicUsize::new(0)),
            slots,
            capacity,
            mask: capacity - 1,
        });

        Ok((
            RingProducer {
                ring: Arc::clone(&ring),
                write: 0,
                cached_read: 0,
            },
            RingConsumer {
                ring,
                read: 0,
                cached_write: 0,
            },
        ))
    }
}

impl<T> BoundedRing<T> {
    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the number of published, unconsumed items.
    ///
    /// Exact once both handles have stopped moving; only an estimate while
    /// traffic is flowing.
    pub fn len(&self) -> usize {
        // Load read first: write can only have grown since, so the
        // difference never goes negative.
        let read = self.read.load(Acquire);
        let write = self.write.load(Acquire);
        write.wrapping_sub(read).min(self.capacity)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn slot(&self, cursor: usize) -> *mut T {
        self.slots[cursor & self.mask].get()
    }
}

impl<T: Copy> RingProducer<T> {
    /// Push one item. Returns `false`, with no side effect, if the ring is full.
    #[inline]
    #[must_use]
    pub fn try_push(&mut self, item: T) -> bool {
        if self.write.wrapping_sub(self.cached_read) == self.ring.capacity {
            self.cached_read = self.ring.read.load(Acquire);
            if self.write.wrapping_sub(self.cached_read) == self.ring.capacity {
                return false;
            }
        }

        // SAFETY: the slot at `write` lies in the free region, which the
        // consumer does not touch until the publish below.
        unsafe { self.ring.slot(self.write).write(item) };

        self.write = self.write.wrapping_add(1);
        self.ring.write.store(self.write, Release);
        true
    }

    /// Push as many of `items` as fit, in order, behind a single cursor
    /// publish. Returns how many were pushed; 0 when the ring is full.
    #[inline]
    pub fn try_push_bulk(&mut self, items: &[T]) -> usize {
        let n = items.len();
        if n == 0 {
            return 0;
        }

        let mut free = self.ring.capacity - self.write.wrapping_sub(self.cached_read);
        if free < n {
            self.cached_read = self.ring.read.load(Acquire);
            free = self.ring.capacity - self.write.wrapping_sub(self.cached_read);
        }

        let to_push = n.min(free);
        if to_push == 0 {
            return 0;
        }

        for (i, item) in items[..to_push].iter().enumerate() {
            // SAFETY: every cursor in write..write + to_push is free.
            unsafe { self.ring.slot(self.write.wrapping_add(i)).write(*item) };
        }

        self.write = self.write.wrapping_add(to_push);
        self.ring.write.store(self.write, Release);
        to_push
    }

    /// Free slots as of now; refreshes the cached read cursor.
    pub fn free_slots(&mut self) -> usize {
        self.cached_read = self.ring.read.load(Acquire);
        self.ring.capacity - self.write.wrapping_sub(self.cached_read)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity
    }

    /// The shared ring, for residency accounting after the stages stop.
    pub fn shared(&self) -> Arc<BoundedRing<T>> {
        Arc::clone(&self.ring)
    }
}

impl<T: Copy + Default> RingProducer<T> {
    /// Touch every slot the producer currently owns so its pages are
    /// resident before the hot loop starts. Called once, before traffic;
    /// at that point the producer owns every slot.
    pub fn prefault(&mut self) {
        self.cached_read = self.ring.read.load(Acquire);
        let owned = self.ring.capacity - self.write.wrapping_sub(self.cached_read);
        for i in 0..owned {
            // SAFETY: free-region slots are invisible to the consumer.
            unsafe {
                self.ring
                    .slot(self.write.wrapping_add(i))
                    .write_volatile(T::default())
            };
        }
    }
}

impl<T: Copy> RingConsumer<T> {
    /// Pop one item, or `None` if the ring is empty.
    #[inline]
    pub fn try_pop(&mut self) -> Option<T> {
        if self.read == self.cached_write {
            self.cached_write = self.ring.write.load(Acquire);
            if self.read == self.cached_write {
                return None;
            }
        }

        // SAFETY: the slot at `read` was published by the Acquire load above
        // (or an earlier one) and the producer will not reuse it until the
        // Release below.
        let item = unsafe { self.ring.slot(self.read).read() };

        self.read = self.read.wrapping_add(1);
        self.ring.read.store(self.read, Release);
        Some(item)
    }

    /// Pop up to `out.len()` items in FIFO order behind a single cursor
    /// publish. Returns how many were written to the front of `out`.
    #[inline]
    pub fn try_pop_bulk(&mut self, out: &mut [T]) -> usize {
        let n = out.len();
        if n == 0 {
            return 0;
        }

        let mut available = self.cached_write.wrapping_sub(self.read);
        if available < n {
            self.cached_write = self.ring.write.load(Acquire);
            available = self.cached_write.wrapping_sub(self.read);
        }

        let to_pop = n.min(available);
        if to_pop == 0 {
            return 0;
        }

        for (i, slot) in out[..to_pop].iter_mut().enumerate() {
            // SAFETY: every cursor in read..read + to_pop is published.
            *slot = unsafe { self.ring.slot(self.read.wrapping_add(i)).read() };
        }

        self.read = self.read.wrapping_add(to_pop);
        self.ring.read.store(self.read, Release);
        to_pop
    }

    /// Items available right now; refreshes the cached write cursor.
    pub fn len(&mut self) -> usize {
        self.cached_write = self.ring.write.load(Acquire);
        self.cached_write.wrapping_sub(self.read)
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity
    }

    pub fn shared(&self) -> Arc<BoundedRing<T>> {
        Arc::clone(&self.ring)
    }
}

// Debug proxies that call the standalone debug functions

impl<T> fmt::Debug for BoundedRing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_bounded_ring(
            self.capacity,
            self.write.load(Relaxed),
            self.read.load(Relaxed),
            f,
        )
    }
}

impl<T> fmt::Debug for RingProducer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_ring_handle(
            "RingProducer",
            self.ring.capacity,
            self.write,
            self.cached_read,
            f,
        )
    }
}

impl<T> fmt::Debug for RingConsumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_ring_handle(
            "RingConsumer",
            self.ring.capacity,
            self.read,
            self.cached_write,
            f,
        )
    }
}
