use std::io;

use thiserror::Error;

use super::stage::StageKind;

/// Everything that can go wrong outside the hot path.
///
/// A full or empty ring is not an error: ring operations report that through
/// their `bool` / `Option` / count returns.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("ring capacity must be a non-zero power of two, got {capacity}")]
    InvalidCapacity { capacity: usize },

    #[error("burst size {burst} must be between 1 and the smaller ring capacity ({limit})")]
    InvalidBurst { burst: usize, limit: usize },

    #[error("truncated field width must be between 1 and 32 bits, got {bits}")]
    InvalidFieldWidth { bits: u32 },

    #[error("failed to spawn the {stage} stage thread")]
    Spawn {
        stage: StageKind,
        #[source]
        source: io::Error,
    },

    #[error("the {stage} stage panicked")]
    StagePanicked { stage: StageKind },

    #[error("failed to pin the {stage} stage to core {core}")]
    Affinity {
        stage: StageKind,
        core: usize,
        #[source]
        source: io::Error,
    },

    #[error("failed to lock process memory")]
    MemoryLock(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
