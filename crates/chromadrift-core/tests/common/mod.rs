use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chromadrift_core::error::{ChromaDriftError, Result};
use chromadrift_core::io::VolumeSource;
use chromadrift_core::volume::{PixelType, Volume};
use ndarray::{Array2, Array3, ArrayD};

/// Isotropic Gaussian spot on a flat background.
pub fn gaussian_plane(rows: usize, cols: usize, cy: f64, cx: f64, sigma: f64, peak: f64) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |(y, x)| {
        let dy = y as f64 - cy;
        let dx = x as f64 - cx;
        10.0 + peak * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()
    })
}

/// Two overlapping blobs of different widths, so the intensity histogram is
/// not symmetric under translation.
pub fn two_blob_plane(rows: usize, cols: usize, shift_y: f64, shift_x: f64) -> Array2<f64> {
    let a = gaussian_plane(rows, cols, rows as f64 * 0.45 + shift_y, cols as f64 * 0.4 + shift_x, 6.0, 800.0);
    let b = gaussian_plane(rows, cols, rows as f64 * 0.6 + shift_y, cols as f64 * 0.62 + shift_x, 3.5, 500.0);
    a + b
}

/// Deterministic non-repeating integer ramp pattern.
pub fn pattern_plane(rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |(y, x)| ((y * 31 + x * 17 + y * x) % 97) as f64)
}

pub fn planar_volume(plane: Array2<f64>, dtype: PixelType) -> Volume {
    let plane = plane.mapv(|v| dtype.cast(v));
    Volume::from_plane(plane, dtype)
}

pub fn constant_volume(shape: (usize, usize, usize), value: f64, dtype: PixelType) -> Volume {
    Volume::new(Array3::from_elem(shape, value), dtype)
}

/// JSON transform store with one microscope.
pub fn store_json(microscope: &str, transforms: &[(&str, [[f64; 3]; 3])]) -> String {
    let channels: serde_json::Map<String, serde_json::Value> = transforms
        .iter()
        .map(|(name, m)| {
            let rows: Vec<Vec<f64>> = m.iter().map(|r| r.to_vec()).collect();
            (name.to_string(), serde_json::json!(rows))
        })
        .collect();
    let mut store = serde_json::Map::new();
    store.insert(microscope.to_string(), serde_json::Value::Object(channels));
    serde_json::Value::Object(store).to_string()
}

pub fn translation_matrix(tx: f64, ty: f64) -> [[f64; 3]; 3] {
    [[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]]
}

pub const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// In-memory `VolumeSource` keyed by path.
#[derive(Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, (ArrayD<f64>, PixelType)>,
}

impl MemorySource {
    pub fn insert(&mut self, path: impl Into<PathBuf>, array: ArrayD<f64>, dtype: PixelType) {
        self.files.insert(path.into(), (array, dtype));
    }
}

impl VolumeSource for MemorySource {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn load(&self, path: &Path) -> Result<(ArrayD<f64>, PixelType)> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ChromaDriftError::MissingFile(path.to_path_buf()))
    }
}
