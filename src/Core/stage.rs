// Stage identity, shared by the error type and the stage loops

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    Source,
    Extender,
    Sink,
}

impl StageKind {
    /// Position in the pipeline, source first.
    pub fn index(self) -> usize {
        match self {
            StageKind::Source => 0,
            StageKind::Extender => 1,
            StageKind::Sink => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Source => "source",
            StageKind::Extender => "extender",
            StageKind::Sink => "sink",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
