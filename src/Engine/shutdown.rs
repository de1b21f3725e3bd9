use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide stop request shared by every stage.
///
/// Goes from `false` to `true` at most once and is never reset. Stages only
/// poll it; whatever raises it (Ctrl+C, a timer, orchestration code) lives
/// outside the pipeline.
#[derive(Clone, Debug, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every stage to stop at its next iteration boundary.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
