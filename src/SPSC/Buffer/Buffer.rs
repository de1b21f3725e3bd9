// This is the bounded SPSC ring shared by exactly two pipeline stages

use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

/// A fixed-capacity, lock-free, single-producer single-consumer ring.
///
/// The ring itself is never used directly for transfer. [`BoundedRing::split`]
/// hands out one [`RingProducer`] and one [`RingConsumer`]; neither handle is
/// `Clone`, so the one-writer/one-reader contract holds by construction.
///
/// ### Concurrency Design:
/// - **Producer**: writes the slot at `write & mask`, then publishes
///   `write + 1` with a Release store. The consumer's Acquire load of the
///   cursor therefore sees the completed slot.
/// - **Consumer**: reads the slot at `read & mask`, then publishes `read + 1`
///   with a Release store, handing the slot back to the producer.
/// - `write - read` stays in `[0, capacity]`. Cursors grow monotonically and
///   use wrapping arithmetic.
pub struct BoundedRing<T> {
    /// Producer-written, consumer-read.
    pub(crate) write: CachePadded<AtomicUsize>,

    /// Consumer-written, producer-read.
    pub(crate) read: CachePadded<AtomicUsize>,

    /// Backing slots, one heap allocation made at construction.
    pub(crate) slots: Box<[UnsafeCell<T>]>,

    /// Number of slots. Always a power of two.
    pub(crate) capacity: usize,

    /// `capacity - 1`, used to map cursors onto slots.
    pub(crate) mask: usize,
}

// SAFETY: slot ownership is partitioned by the cursors. A slot is written only
// by the producer while it lies in the free region and read only by the
// consumer after the covering cursor publish.
unsafe impl<T: Send> Send for BoundedRing<T> {}
unsafe impl<T: Send> Sync for BoundedRing<T> {}

/// The writing half of a [`BoundedRing`].
pub struct RingProducer<T> {
    pub(crate) ring: Arc<BoundedRing<T>>,
    /// Authoritative write cursor. The shared copy is only a publication.
    pub(crate) write: usize,
    /// Last observed read cursor; refreshed only when the ring looks full.
    pub(crate) cached_read: usize,
}

/// The reading half of a [`BoundedRing`].
pub struct RingConsumer<T> {
    pub(crate) ring: Arc<BoundedRing<T>>,
    pub(crate) read: usize,
    /// Last observed write cursor; refreshed only when the ring looks empty.
    pub(crate) cached_write: usize,
}
