use std::fmt;

use crate::Timestamp::TimestampExtender;

/// Debug function for BoundedRing
///
/// Shows:
/// - Capacity
/// - Published write and read cursors
/// - Occupancy derived from them
///
/// Never dereferences a slot, so it is safe to call while both handles are live.
pub fn debug_bounded_ring(
    capacity: usize,
    write: usize,
    read: usize,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.debug_struct("BoundedRing")
        .field("capacity", &capacity)
        .field("write", &write)
        .field("read", &read)
        .field("len", &write.wrapping_sub(read).min(capacity))
        .finish_non_exhaustive()
}

/// Debug function for RingProducer / RingConsumer
///
/// `own` is the handle's authoritative cursor, `cached` its last view of the
/// opposite one.
pub fn debug_ring_handle(
    name: &str,
    capacity: usize,
    own: usize,
    cached: usize,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.debug_struct(name)
        .field("capacity", &capacity)
        .field("cursor", &own)
        .field("cached_peer", &cached)
        .finish_non_exhaustive()
}

/// Debug function for TimestampExtender
///
/// Prints the era and last sample in hex, the way timestamps are usually read.
pub fn debug_timestamp_extender(
    extender: &TimestampExtender,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.debug_struct("TimestampExtender")
        .field("width", &extender.field().width())
        .field("era", &format_args!("{:#x}", extender.era()))
        .field("prev", &format_args!("{:#x}", extender.prev()))
        .finish()
}
