use super::runner::Pipeline;
use super::shutdown::ShutdownSignal;
use crate::Core::error::{PipelineError, Result};
use crate::Timestamp::{TruncatedField, DEFAULT_FIELD_WIDTH};

pub const DEFAULT_INBOUND_CAPACITY: usize = 1 << 16;
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 1 << 18;
pub const DEFAULT_BURST: usize = 32;
pub const DEFAULT_SEED: u64 = 0x0000_0000_001F_F000;
pub const DEFAULT_DRAIN_RETRIES: u32 = 64;

/// Validated settings for one run. Produced by [`PipelineBuilder::build`].
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub inbound_capacity: usize,
    pub outbound_capacity: usize,
    pub burst: usize,
    pub field: TruncatedField,
    pub seed: u64,
    /// Sink stops after this many deliveries; `None` runs until input ends.
    pub expected: Option<u64>,
    pub drain_retries: u32,
    /// Cores for source, extender and sink, in that order.
    pub cores: Option<[usize; 3]>,
    pub lock_memory: bool,
    pub prefault: bool,
    /// Fail the run when pinning or memory locking fails instead of logging.
    pub strict_lifecycle: bool,
}

pub struct PipelineBuilder {
    inbound_capacity: usize,
    outbound_capacity: usize,
    burst: usize,
    field_width: u32,
    seed: u64,
    expected: Option<u64>,
    drain_retries: u32,
    cores: Option<[usize; 3]>,
    lock_memory: bool,
    prefault: bool,
    strict_lifecycle: bool,
    shutdown: Option<ShutdownSignal>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            inbound_capacity: DEFAULT_INBOUND_CAPACITY, // 64K descriptors
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY, // 256K timestamps
            burst: DEFAULT_BURST,
            field_width: DEFAULT_FIELD_WIDTH,
            seed: DEFAULT_SEED,
            expected: None,
            drain_retries: DEFAULT_DRAIN_RETRIES,
            cores: None,
            lock_memory: false,
            prefault: true,
            strict_lifecycle: false,
            shutdown: None,
        }
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity;
        self
    }

    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    pub fn with_burst(mut self, burst: usize) -> Self {
        self.burst = burst;
        self
    }

    pub fn with_field_width(mut self, bits: u32) -> Self {
        self.field_width = bits;
        self
    }

    /// Full-width reference timestamp the extender starts from.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_expected(mut self, expected: u64) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_drain_retries(mut self, retries: u32) -> Self {
        self.drain_retries = retries;
        self
    }

    pub fn with_core_affinity(mut self, cores: [usize; 3]) -> Self {
        self.cores = Some(cores);
        self
    }

    pub fn with_memory_lock(mut self, lock: bool) -> Self {
        self.lock_memory = lock;
        self
    }

    pub fn with_prefault(mut self, prefault: bool) -> Self {
        self.prefault = prefault;
        self
    }

    pub fn with_strict_lifecycle(mut self, strict: bool) -> Self {
        self.strict_lifecycle = strict;
        self
    }

    /// Share an existing signal, e.g. one raised from a Ctrl+C handler.
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        for capacity in [self.inbound_capacity, self.outbound_capacity] {
            if capacity == 0 || (capacity & (capacity - 1)) != 0 {
                return Err(PipelineError::InvalidCapacity { capacity });
            }
        }

        let limit = self.inbound_capacity.min(self.outbound_capacity);
        if self.burst == 0 || self.burst > limit {
            return Err(PipelineError::InvalidBurst {
                burst: self.burst,
                limit,
            });
        }

        let field = TruncatedField::new(self.field_width)?;

        let config = PipelineConfig {
            inbound_capacity: self.inbound_capacity,
            outbound_capacity: self.outbound_capacity,
            burst: self.burst,
            field,
            seed: self.seed,
            expected: self.expected,
            drain_retries: self.drain_retries,
            cores: self.cores,
            lock_memory: self.lock_memory,
            prefault: self.prefault,
            strict_lifecycle: self.strict_lifecycle,
        };
        Ok(Pipeline::new(config, self.shutdown.unwrap_or_default()))
    }
}
