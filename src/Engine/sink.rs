use std::collections::VecDeque;

use crossbeam_utils::Backoff;

use super::stage::{stop, ExitReason, StageContext, StageReport};
use crate::SPSC::Buffer::RingConsumer;

/// Where reconstructed timestamps end up (matching engine, risk checks, ...).
///
/// Called on the sink thread, once per item, in submission order.
pub trait TimestampSink: Send {
    fn deliver(&mut self, timestamp: u64);
}

impl<F> TimestampSink for F
where
    F: FnMut(u64) + Send,
{
    #[inline]
    fn deliver(&mut self, timestamp: u64) {
        self(timestamp)
    }
}

/// Keeps the head and tail of the stream plus a few running checks.
///
/// Storage is reserved up front; `deliver` never allocates.
#[derive(Clone, Debug)]
pub struct RecordingSink {
    keep: usize,
    first: Vec<u64>,
    last: VecDeque<u64>,
    count: u64,
    previous: Option<u64>,
    backward_steps: u64,
}

impl RecordingSink {
    pub const DEFAULT_KEEP: usize = 10;

    /// Record the first and last `keep` timestamps.
    pub fn new(keep: usize) -> Self {
        Self {
            keep,
            first: Vec::with_capacity(keep),
            last: VecDeque::with_capacity(keep),
            count: 0,
            previous: None,
            backward_steps: 0,
        }
    }

    pub fn first(&self) -> &[u64] {
        &self.first
    }

    /// Oldest first.
    pub fn last(&self) -> Vec<u64> {
        self.last.iter().copied().collect()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// How many values were smaller than the one before them.
    pub fn backward_steps(&self) -> u64 {
        self.backward_steps
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEEP)
    }
}

impl TimestampSink for RecordingSink {
    fn deliver(&mut self, timestamp: u64) {
        if self.first.len() < self.keep {
            self.first.push(timestamp);
        }
        if self.keep > 0 {
            if self.last.len() == self.keep {
                self.last.pop_front();
            }
            self.last.push_back(timestamp);
        }
        if self.previous.is_some_and(|p| timestamp < p) {
            self.backward_steps += 1;
        }
        self.previous = Some(timestamp);
        self.count += 1;
    }
}

/// Sink loop: pop reconstructed timestamps and hand them to `sink` until
/// `expected` items were delivered, the extender stopped with nothing left
/// in the ring, or shutdown is seen.
pub(crate) fn run_sink<S: TimestampSink>(
    ctx: &StageContext,
    sink: &mut S,
    mut outbound: RingConsumer<u64>,
    burst: usize,
    expected: Option<u64>,
) -> StageReport {
    let _guard = ctx.enter();
    let backoff = Backoff::new();
    let mut popped = vec![0u64; burst];
    let mut delivered = 0u64;

    let exit = loop {
        if ctx.shutdown.is_requested() {
            break ExitReason::Shutdown;
        }

        // Never pop past the expected count; extra items stay in the ring.
        let want = match expected {
            Some(total) if delivered >= total => break ExitReason::ExpectedReached,
            Some(total) => burst.min((total - delivered) as usize),
            None => burst,
        };

        let n = outbound.try_pop_bulk(&mut popped[..want]);
        if n == 0 {
            if ctx.upstream_done() && outbound.is_empty() {
                break ExitReason::InputExhausted;
            }
            backoff.snooze();
            continue;
        }
        backoff.reset();

        for &timestamp in &popped[..n] {
            sink.deliver(timestamp);
        }
        delivered += n as u64;
    };

    stop(ctx, exit, delivered, delivered)
}
