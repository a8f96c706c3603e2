/// Minimum pixel count (rows*cols) of a plane to warp depth slices in parallel.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum channel count to warp channels in parallel.
pub const PARALLEL_CHANNEL_THRESHOLD: usize = 2;

/// Minimum frame count to register time-series frames in parallel.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Determinant magnitude below which an affine matrix is treated as singular.
pub const SINGULAR_DETERMINANT: f64 = 1e-12;

/// Default number of joint-histogram bins for the mutual information metric.
pub const DEFAULT_HISTOGRAM_BINS: usize = 100;

/// Default initial step length of the regular-step gradient descent, in pixels.
pub const DEFAULT_LEARNING_RATE: f64 = 1.0;

/// Default minimum step length; the optimizer stops once the step shrinks below it.
pub const DEFAULT_MIN_STEP: f64 = 1e-5;

/// Default iteration budget of the optimizer.
pub const DEFAULT_MAX_ITERATIONS: usize = 500;

/// Default gradient magnitude below which the optimizer reports convergence.
pub const DEFAULT_GRADIENT_TOLERANCE: f64 = 1e-8;

/// Factor applied to the step length whenever the gradient reverses direction.
pub const DEFAULT_RELAXATION_FACTOR: f64 = 0.5;

/// Parameter offset (pixels) for central-difference metric gradients.
pub const GRADIENT_DELTA: f64 = 0.01;

/// Minimum fraction of fixed samples that must land inside the moving volume.
pub const MIN_OVERLAP_FRACTION: f64 = 0.25;

/// Default suffix inserted before the extension of aligned output files.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_aligned";
