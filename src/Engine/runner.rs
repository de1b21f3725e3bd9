use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Instant;

use tracing::{info, warn};

use super::builder::{PipelineBuilder, PipelineConfig};
use super::extender_stage::run_extender;
use super::report::PipelineReport;
use super::shutdown::ShutdownSignal;
use super::sink::{run_sink, TimestampSink};
use super::source::run_source;
use super::stage::{Completion, StageContext, StageKind, StageReport, StageState, StateCell};
use crate::Core::affinity::pin_current_thread;
use crate::Core::cycles::read_cycle_counter;
use crate::Core::error::{PipelineError, Result};
use crate::Core::memory::lock_all_memory;
use crate::SPSC::Buffer::BoundedRing;
use crate::SPSC::Structs::EventDescriptor;
use crate::Timestamp::TimestampExtender;

/// Source -> extender -> sink, one thread each, linked by two SPSC rings.
///
/// The rings are created per [`run`](Pipeline::run) and owned by it; each
/// stage thread holds exactly the handles it needs.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    shutdown: ShutdownSignal,
    states: [StateCell; 3],
}

impl Pipeline {
    pub(crate) fn new(config: PipelineConfig, shutdown: ShutdownSignal) -> Self {
        Self {
            config,
            shutdown,
            states: [StateCell::new(), StateCell::new(), StateCell::new()],
        }
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The signal every stage polls. Once raised it stays raised, so later
    /// runs of this pipeline stop immediately.
    pub fn shutdown(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Current state of one stage. Safe to call from any thread, including
    /// from inside the sink while [`run`](Pipeline::run) is in progress.
    pub fn stage_state(&self, kind: StageKind) -> StageState {
        self.states[kind.index()].get()
    }

    /// Drive `events` through the pipeline into `sink` and block until all
    /// three stages have stopped. Returns the run report and the sink.
    pub fn run<I, S>(&self, events: I, mut sink: S) -> Result<(PipelineReport, S)>
    where
        I: IntoIterator<Item = EventDescriptor>,
        I::IntoIter: Send,
        S: TimestampSink,
    {
        let config = &self.config;
        info!(
            inbound = config.inbound_capacity,
            outbound = config.outbound_capacity,
            burst = config.burst,
            width = config.field.width(),
            seed = %format_args!("{:#x}", config.seed),
            expected = ?config.expected,
            "starting timestamp pipeline"
        );

        if config.lock_memory {
            if let Err(e) = lock_all_memory() {
                if config.strict_lifecycle {
                    return Err(PipelineError::MemoryLock(e));
                }
                warn!(error = %e, "mlockall failed, continuing without locked memory");
            }
        }

        let (mut inbound_tx, inbound_rx) =
            BoundedRing::<EventDescriptor>::split(config.inbound_capacity)?;
        let (mut outbound_tx, outbound_rx) = BoundedRing::<u64>::split(config.outbound_capacity)?;
        if config.prefault {
            inbound_tx.prefault();
            outbound_tx.prefault();
        }
        let inbound = inbound_tx.shared();
        let outbound = outbound_tx.shared();

        let source_done = Completion::default();
        let extender_done = Completion::default();
        let sink_done = Completion::default();
        let core = |i: usize| config.cores.map(|cores| cores[i]);

        let source_ctx = self.context(
            StageKind::Source,
            None,
            Some(&extender_done),
            &source_done,
            core(0),
        );
        let extender_ctx = self.context(
            StageKind::Extender,
            Some(&source_done),
            Some(&sink_done),
            &extender_done,
            core(1),
        );
        let sink_ctx = self.context(
            StageKind::Sink,
            Some(&extender_done),
            None,
            &sink_done,
            core(2),
        );

        let unwrapper = TimestampExtender::new(config.seed, config.field);
        let events = events.into_iter();
        let burst = config.burst;
        let expected = config.expected;
        let strict = config.strict_lifecycle;
        let sink_ref = &mut sink;

        let started = Instant::now();
        let start_cycles = read_cycle_counter();

        let (source, extender, sink_report) = thread::scope(|scope| -> Result<_> {
            let source = self.spawn(scope, &source_ctx, strict, move |ctx| {
                run_source(ctx, events, inbound_tx, burst)
            })?;
            let extender = self.spawn(scope, &extender_ctx, strict, move |ctx| {
                run_extender(ctx, unwrapper, inbound_rx, outbound_tx, burst)
            })?;
            let sink = self.spawn(scope, &sink_ctx, strict, move |ctx| {
                run_sink(ctx, sink_ref, outbound_rx, burst, expected)
            })?;

            // Join everything before looking at results so no stage is left
            // unjoined when another one failed.
            let source = join(source, StageKind::Source);
            let extender = join(extender, StageKind::Extender);
            let sink = join(sink, StageKind::Sink);
            Ok((source?, extender?, sink?))
        })?;

        let cycles = read_cycle_counter().wrapping_sub(start_cycles);
        let report = PipelineReport {
            source,
            extender,
            sink: sink_report,
            inbound_resident: inbound.len() as u64,
            outbound_resident: outbound.len() as u64,
            expected,
            shutdown_requested: self.shutdown.is_requested(),
            elapsed: started.elapsed(),
            cycles,
        };

        if report.shutdown_requested && !report.is_complete() {
            warn!(
                delivered = report.delivered(),
                expected = ?report.expected,
                dropped = report.dropped(),
                inbound_resident = report.inbound_resident,
                outbound_resident = report.outbound_resident,
                "shutdown truncated the run"
            );
        }
        info!(
            delivered = report.delivered(),
            elapsed = ?report.elapsed,
            cycles_per_item = report.cycles_per_item(),
            "timestamp pipeline stopped"
        );

        Ok((report, sink))
    }

    fn context(
        &self,
        kind: StageKind,
        upstream: Option<&Completion>,
        downstream: Option<&Completion>,
        finished: &Completion,
        core: Option<usize>,
    ) -> StageContext {
        StageContext {
            kind,
            shutdown: self.shutdown.clone(),
            upstream: upstream.cloned(),
            downstream: downstream.cloned(),
            finished: finished.clone(),
            state: self.states[kind.index()].clone(),
            drain_retries: self.config.drain_retries,
            core,
        }
    }

    fn spawn<'scope, 'env, F>(
        &self,
        scope: &'scope Scope<'scope, 'env>,
        ctx: &'scope StageContext,
        strict: bool,
        body: F,
    ) -> Result<ScopedJoinHandle<'scope, Result<StageReport>>>
    where
        F: FnOnce(&StageContext) -> StageReport + Send + 'scope,
    {
        thread::Builder::new()
            .name(format!("hwts-{}", ctx.kind))
            .spawn_scoped(scope, move || {
                if let Some(core) = ctx.core {
                    if let Err(source) = pin_current_thread(core) {
                        if strict {
                            ctx.shutdown.request();
                            ctx.finished.mark();
                            return Err(PipelineError::Affinity {
                                stage: ctx.kind,
                                core,
                                source,
                            });
                        }
                        warn!(stage = %ctx.kind, core, error = %source, "could not pin stage");
                    }
                }
                Ok(body(ctx))
            })
            .map_err(|source| {
                // Stages already running would otherwise wait on this one forever.
                self.shutdown.request();
                PipelineError::Spawn {
                    stage: ctx.kind,
                    source,
                }
            })
    }
}

fn join(handle: ScopedJoinHandle<'_, Result<StageReport>>, stage: StageKind) -> Result<StageReport> {
    handle
        .join()
        .map_err(|_| PipelineError::StagePanicked { stage })?
}
