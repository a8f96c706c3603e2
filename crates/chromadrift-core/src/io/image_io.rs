use std::path::Path;

use ndarray::{Array2, ArrayD};

use crate::error::{ChromaDriftError, Result};
use crate::volume::PixelType;

use super::tiff_stack;

/// Load a single-plane image (PNG, BMP, ...) as grayscale.
///
/// Sources with more than 8 bits per channel load as `U16`, others as `U8`.
pub fn load_plane(path: &Path) -> Result<(Array2<f64>, PixelType)> {
    if !path.exists() {
        return Err(ChromaDriftError::MissingFile(path.to_path_buf()));
    }
    let img = image::open(path)?;
    let color = img.color();
    let bits_per_channel = color.bits_per_pixel() / color.channel_count() as u16;

    if bits_per_channel > 8 {
        let gray = img.to_luma16();
        let (w, h) = gray.dimensions();
        let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
            gray.get_pixel(col as u32, row as u32).0[0] as f64
        });
        Ok((data, PixelType::U16))
    } else {
        let gray = img.to_luma8();
        let (w, h) = gray.dimensions();
        let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
            gray.get_pixel(col as u32, row as u32).0[0] as f64
        });
        Ok((data, PixelType::U8))
    }
}

/// Load any supported image file, choosing the reader from the extension.
pub fn load_array(path: &Path) -> Result<(ArrayD<f64>, PixelType)> {
    if is_tiff(path) {
        tiff_stack::read_array(path)
    } else {
        let (plane, dtype) = load_plane(path)?;
        Ok((plane.into_dyn(), dtype))
    }
}

pub fn is_tiff(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("tif" | "tiff")
    )
}
