// Pieces every stage loop shares: identity, lifecycle, completion flags, and
// the push-with-retry protocol used on both producing edges.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use crossbeam_utils::Backoff;
use tracing::{debug, warn};

use super::shutdown::ShutdownSignal;
pub use crate::Core::stage::StageKind;
use crate::SPSC::Buffer::RingProducer;

/// `Running -> Draining -> Stopped`, reached independently by each stage.
///
/// A stage enters `Draining` only when shutdown finds it holding a burst it
/// could not push yet. Live values are read with
/// [`Pipeline::stage_state`](super::Pipeline::stage_state); a stage that is
/// not part of a run reads as `Stopped`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum StageState {
    Running = 0,
    Draining = 1,
    Stopped = 2,
}

impl StageState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => StageState::Running,
            1 => StageState::Draining,
            _ => StageState::Stopped,
        }
    }
}

/// Live [`StageState`] of one stage, written by the stage thread and read by
/// anyone holding the pipeline.
#[derive(Clone, Debug)]
pub(crate) struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicU8::new(StageState::Stopped as u8)))
    }

    pub(crate) fn set(&self, state: StageState) {
        self.0.store(state as u8, Ordering::Release);
    }

    pub(crate) fn get(&self) -> StageState {
        StageState::from_u8(self.0.load(Ordering::Acquire))
    }
}

/// Why a stage left `Running`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// Input ran out: the source iterator ended, or the upstream stage
    /// stopped and its ring was empty.
    InputExhausted,
    /// The sink delivered the configured number of items.
    ExpectedReached,
    /// The shutdown signal was observed.
    Shutdown,
    /// The downstream stage stopped, so nothing more could be pushed.
    DownstreamStopped,
}

/// What one stage did during a run.
///
/// `received` counts items taken in (pulled from the source iterator or
/// popped from the upstream ring), `forwarded` items handed on (pushed or
/// delivered) and `dropped` items taken in but abandoned while draining.
/// `received == forwarded + dropped` always holds. `state` is the state the
/// stage ended in, so it is always `Stopped` in a finished report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageReport {
    pub kind: StageKind,
    pub state: StageState,
    pub exit: ExitReason,
    pub received: u64,
    pub forwarded: u64,
    pub dropped: u64,
}

/// One-way "this stage has stopped" flag read by its neighbours.
#[derive(Clone, Debug, Default)]
pub(crate) struct Completion(Arc<AtomicBool>);

impl Completion {
    /// Release pairs with the Acquire in `is_done`: every push the stage made
    /// is visible to whoever sees the flag.
    pub(crate) fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub(crate) fn is_done(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Wiring handed to a stage thread.
pub(crate) struct StageContext {
    pub kind: StageKind,
    pub shutdown: ShutdownSignal,
    /// Set by the stage feeding our input ring. `None` for the source.
    pub upstream: Option<Completion>,
    /// Set by the stage draining our output ring. `None` for the sink.
    pub downstream: Option<Completion>,
    /// Ours to set on exit.
    pub finished: Completion,
    pub state: StateCell,
    /// Push attempts allowed for a held burst once shutdown is observed.
    pub drain_retries: u32,
    pub core: Option<usize>,
}

impl StageContext {
    pub(crate) fn upstream_done(&self) -> bool {
        self.upstream.as_ref().is_some_and(Completion::is_done)
    }

    pub(crate) fn downstream_done(&self) -> bool {
        self.downstream.as_ref().is_some_and(Completion::is_done)
    }

    pub(crate) fn enter(&self) -> FinishGuard<'_> {
        self.state.set(StageState::Running);
        debug!(stage = %self.kind, core = ?self.core, "stage running");
        FinishGuard { ctx: self }
    }
}

/// Marks the stage finished when dropped, including on unwind. A panicking
/// stage also raises shutdown so its neighbours cannot spin forever.
pub(crate) struct FinishGuard<'a> {
    ctx: &'a StageContext,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!(stage = %self.ctx.kind, "stage panicked, requesting shutdown");
            self.ctx.shutdown.request();
        }
        self.ctx.state.set(StageState::Stopped);
        self.ctx.finished.mark();
    }
}

/// Result of pushing one held burst.
pub(crate) struct PushOutcome {
    pub pushed: usize,
    /// Set when the burst could not be fully pushed.
    pub interrupted: Option<ExitReason>,
}

/// Push all of `items`, advancing past partial pushes and backing off while
/// the ring is full. Gives up on shutdown after at most `drain_retries`
/// further attempts, or as soon as the downstream stage has stopped.
pub(crate) fn push_with_retry<T: Copy>(
    ctx: &StageContext,
    producer: &mut RingProducer<T>,
    items: &[T],
    backoff: &Backoff,
) -> PushOutcome {
    let mut offset = 0;
    while offset < items.len() {
        let n = producer.try_push_bulk(&items[offset..]);
        offset += n;
        if n > 0 {
            backoff.reset();
            continue;
        }

        if ctx.shutdown.is_requested() {
            ctx.state.set(StageState::Draining);
            debug!(stage = %ctx.kind, held = items.len() - offset, "stage draining");
            for _ in 0..ctx.drain_retries {
                if offset == items.len() {
                    break;
                }
                offset += producer.try_push_bulk(&items[offset..]);
                std::hint::spin_loop();
            }
            return PushOutcome {
                pushed: offset,
                interrupted: (offset < items.len()).then_some(ExitReason::Shutdown),
            };
        }

        if ctx.downstream_done() {
            return PushOutcome {
                pushed: offset,
                interrupted: Some(ExitReason::DownstreamStopped),
            };
        }

        backoff.snooze();
    }

    PushOutcome {
        pushed: offset,
        interrupted: None,
    }
}

/// Final bookkeeping shared by all stage loops.
pub(crate) fn stop(
    ctx: &StageContext,
    exit: ExitReason,
    received: u64,
    forwarded: u64,
) -> StageReport {
    let dropped = received - forwarded;
    if dropped > 0 {
        warn!(stage = %ctx.kind, dropped, ?exit, "items dropped while draining");
    }
    debug!(stage = %ctx.kind, received, forwarded, ?exit, "stage stopped");

    StageReport {
        kind: ctx.kind,
        state: StageState::Stopped,
        exit,
        received,
        forwarded,
        dropped,
    }
}
