pub mod config;
mod chromatic;
mod drift;
mod helpers;
mod types;

pub use chromatic::run_chromatic;
pub use drift::{run_drift_correction, split_frames};
pub use types::{NoOpReporter, PipelineStage, ProgressReporter, RunReport, SkipReason, SkippedInput};
