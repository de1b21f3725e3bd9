use crossbeam_utils::Backoff;

use super::stage::{push_with_retry, stop, ExitReason, StageContext, StageReport};
use crate::SPSC::Buffer::{RingConsumer, RingProducer};
use crate::SPSC::Structs::EventDescriptor;
use crate::Timestamp::TimestampExtender;

/// Extender loop: pop a burst of descriptors, unwrap their timestamps with
/// the batched path, push the full values downstream.
///
/// `extender` is owned by this thread for the whole run.
pub(crate) fn run_extender(
    ctx: &StageContext,
    mut extender: TimestampExtender,
    mut inbound: RingConsumer<EventDescriptor>,
    mut outbound: RingProducer<u64>,
    burst: usize,
) -> StageReport {
    let _guard = ctx.enter();
    let backoff = Backoff::new();
    let mut popped = vec![EventDescriptor::default(); burst];
    let mut extended = vec![0u64; burst];
    let mut received = 0u64;
    let mut forwarded = 0u64;

    let exit = loop {
        if ctx.shutdown.is_requested() {
            break ExitReason::Shutdown;
        }
        // Nothing popped after this point could ever be delivered.
        if ctx.downstream_done() {
            break ExitReason::DownstreamStopped;
        }

        let n = inbound.try_pop_bulk(&mut popped);
        if n == 0 {
            // Upstream's last push happens-before its completion flag, so an
            // empty ring after seeing the flag really is the end.
            if ctx.upstream_done() && inbound.is_empty() {
                break ExitReason::InputExhausted;
            }
            backoff.snooze();
            continue;
        }
        backoff.reset();
        received += n as u64;

        extender.extend_descriptors(&popped[..n], &mut extended[..n]);

        let outcome = push_with_retry(ctx, &mut outbound, &extended[..n], &backoff);
        forwarded += outcome.pushed as u64;
        if let Some(reason) = outcome.interrupted {
            break reason;
        }
    };

    stop(ctx, exit, received, forwarded)
}
