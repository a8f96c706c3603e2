pub mod image_io;
pub mod naming;
pub mod tiff_stack;

use std::path::Path;

use ndarray::ArrayD;

use crate::error::Result;
use crate::volume::PixelType;

/// Something that turns a path into an N-dimensional array with a pixel type.
///
/// The channel-map loader reads through this so callers can substitute
/// their own storage.
pub trait VolumeSource: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn load(&self, path: &Path) -> Result<(ArrayD<f64>, PixelType)>;
}

/// Reads from the local filesystem: TIFF stacks via `tiff`, other formats
/// as single planes via `image`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileVolumeSource;

impl VolumeSource for FileVolumeSource {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn load(&self, path: &Path) -> Result<(ArrayD<f64>, PixelType)> {
        image_io::load_array(path)
    }
}
