// Stand-in for NIC DMA: a deterministic stream of descriptors whose
// hardware timestamp field wraps the way a real device's would.

use crate::SPSC::Structs::EventDescriptor;
use crate::Timestamp::TruncatedField;

/// Payload length stamped on every synthetic descriptor (a minimum Ethernet frame).
pub const SYNTHETIC_PAYLOAD_LEN: u32 = 64;

/// Items between forced jumps of one full period.
pub const DEFAULT_FORCED_WRAP_EVERY: u64 = 100_000;

/// Yields `count` descriptors with a full timestamp starting at `start` and
/// advancing by `10 + (i % 100)` ticks per item (item `i`). Every
/// `forced_wrap_every` items, starting at item 0, the clock also jumps
/// forward one full field period after the item is emitted.
///
/// A forced jump is invisible in the truncated field, so reconstruction
/// falls one era behind the true clock there; comparisons should be made
/// against [`TimestampExtender`](crate::Timestamp::TimestampExtender) run
/// over the same truncated values.
#[derive(Clone, Debug)]
pub struct SyntheticSource {
    field: TruncatedField,
    clock: u64,
    index: u64,
    count: u64,
    forced_wrap_every: Option<u64>,
}

impl SyntheticSource {
    pub fn new(start: u64, count: u64, field: TruncatedField) -> Self {
        Self {
            field,
            clock: start,
            index: 0,
            count,
            forced_wrap_every: Some(DEFAULT_FORCED_WRAP_EVERY),
        }
    }

    /// `None` disables the forced jumps.
    pub fn with_forced_wrap_every(mut self, every: Option<u64>) -> Self {
        self.forced_wrap_every = every.filter(|&n| n > 0);
        self
    }

    /// Descriptors still to be yielded. Unlike `size_hint` this never
    /// saturates, even for counts beyond `usize::MAX`.
    pub fn remaining(&self) -> u64 {
        self.count - self.index
    }

    /// The untruncated clock value of the next item.
    pub fn clock(&self) -> u64 {
        self.clock
    }
}

impl Iterator for SyntheticSource {
    type Item = EventDescriptor;

    fn next(&mut self) -> Option<EventDescriptor> {
        if self.index == self.count {
            return None;
        }
        let i = self.index;
        let event = EventDescriptor::new(i, SYNTHETIC_PAYLOAD_LEN, self.field.truncate(self.clock));

        self.clock = self.clock.wrapping_add(10 + i % 100);
        if self.forced_wrap_every.is_some_and(|every| i % every == 0) {
            self.clock = self.clock.wrapping_add(self.field.period());
        }
        self.index += 1;
        Some(event)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}
