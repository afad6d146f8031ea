pub mod bulk;
pub mod config;
pub mod frame_pipeline;
pub mod sinks;
mod types;

pub use bulk::{export, materialize, materialize_all, validate_range};
pub use config::{
    ClaheConfig, ClipConfig, DenoiseConfig, ExportConfig, ExportFormat, GaussianConfig,
    ProcessingConfig, ReferenceConfig, SessionConfig, SourceConfig, ViewConfig,
};
pub use frame_pipeline::{apply_enhancements, apply_view, FramePipeline};
pub use sinks::{ArraySink, FrameSink, TiffSequenceSink, VideoSink};
pub use types::{NoOpReporter, PipelineStage, ProgressCounter, ProgressReporter};
