use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_GRADIENT_TOLERANCE, DEFAULT_HISTOGRAM_BINS, DEFAULT_LEARNING_RATE,
    DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_STEP, DEFAULT_OUTPUT_SUFFIX, DEFAULT_RELAXATION_FACTOR,
};
use crate::volume::PixelType;

/// Chromatic correction run: which transforms to apply and where inputs come from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChromaticConfig {
    pub output_folder: PathBuf,
    /// JSON transform store.
    pub transform_file: PathBuf,
    pub microscope: String,
    pub mode: InputMode,
}

/// How input images are laid out on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputMode {
    /// A folder of (C, Z, Y, X) TIFF stacks with a known channel order.
    Multichannel {
        input_folder: PathBuf,
        channel_order: Vec<String>,
    },
    /// One file per channel listed in a channel map; each file is corrected
    /// on its own. Missing files and unmapped channels are skipped.
    SplitChannels {
        channel_map: PathBuf,
        #[serde(default = "default_suffix")]
        suffix: String,
    },
    /// Channel-map files grouped into one multichannel volume per
    /// (field, timepoint). Missing files are fatal.
    GroupedChannels {
        channel_map: PathBuf,
        #[serde(default = "default_suffix")]
        suffix: String,
    },
}

fn default_suffix() -> String {
    DEFAULT_OUTPUT_SUFFIX.to_string()
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Multichannel { channel_order, .. } => {
                write!(f, "Multichannel ({})", channel_order.join(", "))
            }
            Self::SplitChannels { suffix, .. } => write!(f, "Split Channels (suffix {})", suffix),
            Self::GroupedChannels { .. } => write!(f, "Grouped Channels"),
        }
    }
}

/// Drift correction run over a folder of time-series stacks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriftConfig {
    pub input_folder: PathBuf,
    pub output_folder: PathBuf,
    /// Pixel type written for registered series.
    #[serde(default = "default_drift_dtype")]
    pub output_dtype: PixelType,
    #[serde(default)]
    pub registration: RegistrationConfig,
}

fn default_drift_dtype() -> PixelType {
    PixelType::U16
}

/// Transform model estimated by the registration engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformModel {
    #[default]
    Translation,
}

impl std::fmt::Display for TransformModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Translation => write!(f, "Translation"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    pub transform: TransformModel,
    /// Joint-histogram bins of the mutual information metric.
    pub histogram_bins: usize,
    /// Initial optimizer step length, in pixels.
    pub learning_rate: f64,
    pub min_step: f64,
    pub max_iterations: usize,
    pub gradient_tolerance: f64,
    /// Step multiplier applied when the gradient reverses direction.
    pub relaxation_factor: f64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            transform: TransformModel::Translation,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            learning_rate: DEFAULT_LEARNING_RATE,
            min_step: DEFAULT_MIN_STEP,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            gradient_tolerance: DEFAULT_GRADIENT_TOLERANCE,
            relaxation_factor: DEFAULT_RELAXATION_FACTOR,
        }
    }
}
