pub mod engine;
pub mod metric;
pub mod optimizer;
pub mod time_series;
pub mod transform;

pub use engine::{resample, PairwiseRegistrationEngine, RegistrationResult, RegistrationState};
pub use optimizer::{RegularStepGradientDescent, StopReason};
pub use time_series::{align_time_series, align_time_series_detailed, AlignedFrame};
pub use transform::{SpatialTransform, TranslationTransform};
