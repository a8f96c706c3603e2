use ndarray::{Array2, Array3, ArrayView2, Axis};
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::transform::Affine2;
use crate::volume::Volume;

use super::interpolate::bilinear_sample;

/// Inverse-warp one plane: every output pixel samples the source at the
/// transform's inverse image of its own coordinate. No dtype cast.
pub fn warp_plane(plane: &ArrayView2<f64>, transform: &Affine2) -> Array2<f64> {
    let (h, w) = plane.dim();
    let mut result = Array2::<f64>::zeros((h, w));

    for row in 0..h {
        for col in 0..w {
            let (src_x, src_y) = transform.apply_inverse(col as f64, row as f64);
            result[[row, col]] = bilinear_sample(plane, src_y, src_x);
        }
    }

    result
}

/// Apply one affine transform slice-by-slice to a volume.
///
/// The output has the input's shape and pixel type; interpolated values are
/// cast with [`PixelType::cast`](crate::volume::PixelType::cast).
pub fn warp_volume(volume: &Volume, transform: &Affine2) -> Volume {
    let (depth, h, w) = volume.data.dim();
    let dtype = volume.dtype;

    let warp_slice = |z: usize| -> Array2<f64> {
        let mut plane = warp_plane(&volume.data.index_axis(Axis(0), z), transform);
        plane.mapv_inplace(|v| dtype.cast(v));
        plane
    };

    let planes: Vec<Array2<f64>> = if depth > 1 && h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..depth).into_par_iter().map(warp_slice).collect()
    } else {
        (0..depth).map(warp_slice).collect()
    };

    let mut data = Array3::<f64>::zeros((depth, h, w));
    for (z, plane) in planes.into_iter().enumerate() {
        data.index_axis_mut(Axis(0), z).assign(&plane);
    }

    Volume::new(data, dtype)
}
