use crossbeam_utils::Backoff;

use super::stage::{push_with_retry, stop, ExitReason, StageContext, StageReport};
use crate::SPSC::Buffer::RingProducer;
use crate::SPSC::Structs::EventDescriptor;

/// Source loop: pull descriptors from `events` a burst at a time and push
/// them into the inbound ring until the iterator ends or shutdown is seen.
pub(crate) fn run_source<I>(
    ctx: &StageContext,
    mut events: I,
    mut inbound: RingProducer<EventDescriptor>,
    burst: usize,
) -> StageReport
where
    I: Iterator<Item = EventDescriptor>,
{
    let _guard = ctx.enter();
    let backoff = Backoff::new();
    let mut held = vec![EventDescriptor::default(); burst];
    let mut received = 0u64;
    let mut forwarded = 0u64;

    let exit = loop {
        if ctx.shutdown.is_requested() {
            break ExitReason::Shutdown;
        }
        if ctx.downstream_done() {
            break ExitReason::DownstreamStopped;
        }

        let mut n = 0;
        while n < burst {
            match events.next() {
                Some(event) => {
                    held[n] = event;
                    n += 1;
                }
                None => break,
            }
        }
        if n == 0 {
            break ExitReason::InputExhausted;
        }
        received += n as u64;

        let outcome = push_with_retry(ctx, &mut inbound, &held[..n], &backoff);
        forwarded += outcome.pushed as u64;
        if let Some(reason) = outcome.interrupted {
            break reason;
        }

        // A short burst means the iterator already returned None.
        if n < burst {
            break ExitReason::InputExhausted;
        }
    };

    stop(ctx, exit, received, forwarded)
}
