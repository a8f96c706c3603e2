use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChromaDriftError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Microscope '{microscope}' not found in transform store (known: {known})")]
    Configuration { microscope: String, known: String },

    #[error("Invalid transform for channel '{channel}': {reason}")]
    InvalidTransform { channel: String, reason: String },

    #[error("Channel '{0}' has no registered transform")]
    MissingTransform(String),

    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Missing image file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Channel map error: {0}")]
    ChannelMap(String),

    #[error(
        "Registration did not converge after {iterations} iterations \
         (gradient magnitude {gradient_magnitude:.3e})"
    )]
    RegistrationNonConvergence {
        iterations: usize,
        gradient_magnitude: f64,
    },

    #[error("Only {valid} of {total} samples map inside the moving volume")]
    InsufficientOverlap { valid: usize, total: usize },

    #[error("Unsupported pixel type: {0}")]
    UnsupportedPixelType(String),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, ChromaDriftError>;
