// Module naming follows project convention (SPSC = Single-Producer Single-Consumer)
#[allow(non_snake_case)]
pub mod SPSC {
    pub mod Buffer {
        #[allow(clippy::module_inception)]
        pub mod Buffer;
        pub mod Buffer_impl;
        pub use Buffer::{BoundedRing, RingConsumer, RingProducer}; // re-export for stable path
    }
    pub mod Structs {
        pub mod Descriptor_Structs;
        pub use Descriptor_Structs::EventDescriptor; // re-export for stable path
    }
}
#[allow(non_snake_case)]
pub mod Timestamp {
    pub mod batched;
    pub mod extender;
    pub mod field;
    pub use batched::LANES;
    pub use extender::TimestampExtender;
    pub use field::{TruncatedField, DEFAULT_FIELD_WIDTH, MAX_FIELD_WIDTH};
}
#[allow(non_snake_case)]
pub mod Engine {
    pub mod builder;
    mod extender_stage;
    pub mod report;
    mod runner;
    pub mod shutdown;
    pub mod sink;
    mod source;
    pub mod stage;
    pub mod synthetic;
    pub use builder::{PipelineBuilder, PipelineConfig};
    pub use report::PipelineReport;
    pub use runner::Pipeline;
    pub use shutdown::ShutdownSignal;
    pub use sink::{RecordingSink, TimestampSink};
    pub use stage::{ExitReason, StageKind, StageReport, StageState};
    pub use synthetic::SyntheticSource;
}
#[allow(non_snake_case)]
pub mod Core {
    pub mod affinity;
    pub mod cycles;
    pub mod error;
    pub mod memory;
    pub mod stage;
    pub use error::{PipelineError, Result};
}
#[allow(non_snake_case)]
mod Debug {
    pub mod StructDebug;
}

pub use Core::{PipelineError, Result};
pub use Engine::{Pipeline, PipelineBuilder, PipelineReport, RecordingSink, ShutdownSignal, SyntheticSource, TimestampSink};
pub use SPSC::Buffer::{BoundedRing, RingConsumer, RingProducer};
pub use SPSC::Structs::EventDescriptor;
pub use Timestamp::{TimestampExtender, TruncatedField};
