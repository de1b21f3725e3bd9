use std::time::Duration;

use super::stage::{ExitReason, StageReport};

/// Outcome of [`Pipeline::run`](super::Pipeline::run).
///
/// Residency is read after all three stages have joined, so the counts are
/// exact.
#[derive(Clone, Debug)]
pub struct PipelineReport {
    pub source: StageReport,
    pub extender: StageReport,
    pub sink: StageReport,
    /// Descriptors pushed by the source but never popped by the extender.
    pub inbound_resident: u64,
    /// Timestamps pushed by the extender but never popped by the sink.
    pub outbound_resident: u64,
    pub expected: Option<u64>,
    pub shutdown_requested: bool,
    pub elapsed: Duration,
    /// Cycle-counter ticks between spawning the stages and joining them.
    pub cycles: u64,
}

impl PipelineReport {
    pub fn delivered(&self) -> u64 {
        self.sink.forwarded
    }

    /// Items lost in draining, across all stages.
    pub fn dropped(&self) -> u64 {
        self.source.dropped + self.extender.dropped + self.sink.dropped
    }

    /// Every item the source pushed is either delivered, dropped while
    /// draining, or still sitting in a ring. Nothing duplicated or invented.
    pub fn is_balanced(&self) -> bool {
        self.source.forwarded == self.extender.received + self.inbound_resident
            && self.extender.received == self.extender.forwarded + self.extender.dropped
            && self.extender.forwarded == self.sink.received + self.outbound_resident
    }

    /// The run delivered everything it was asked to.
    pub fn is_complete(&self) -> bool {
        match self.expected {
            Some(expected) => self.delivered() == expected,
            None => {
                self.source.exit == ExitReason::InputExhausted
                    && self.dropped() == 0
                    && self.delivered() == self.source.received
            }
        }
    }

    pub fn cycles_per_item(&self) -> f64 {
        match self.delivered() {
            0 => 0.0,
            n => self.cycles as f64 / n as f64,
        }
    }

    pub fn nanos_per_item(&self) -> f64 {
        match self.delivered() {
            0 => 0.0,
            n => self.elapsed.as_nanos() as f64 / n as f64,
        }
    }
}
