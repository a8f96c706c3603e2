use ndarray::{Array4, ArrayD, Axis};
use rayon::prelude::*;
use tracing::debug;

use crate::consts::PARALLEL_CHANNEL_THRESHOLD;
use crate::error::{ChromaDriftError, Result};
use crate::transform::{Affine2, TransformCatalog};
use crate::volume::{MultichannelVolume, PixelType, Volume};

use super::affine_warp::warp_volume;

/// Align a raw N-dimensional array, which must be rank 4 (C, Z, Y, X).
pub fn align_channels_dyn(
    array: ArrayD<f64>,
    dtype: PixelType,
    catalog: &TransformCatalog,
    labels: &[String],
) -> Result<MultichannelVolume> {
    let stack = MultichannelVolume::from_dyn(array, dtype)?;
    align_channels(&stack, catalog, labels)
}

/// Warp channel `i` of `stack` with the transform registered for `labels[i]`.
///
/// Every label is resolved before any warping starts, so a missing
/// transform yields an error and no partial output.
pub fn align_channels(
    stack: &MultichannelVolume,
    catalog: &TransformCatalog,
    labels: &[String],
) -> Result<MultichannelVolume> {
    let channels = stack.channel_count();
    if labels.len() != channels {
        return Err(ChromaDriftError::Shape(format!(
            "{} channel labels given for a stack with {} channels",
            labels.len(),
            channels
        )));
    }

    let transforms: Vec<&Affine2> = labels
        .iter()
        .map(|label| catalog.get(label))
        .collect::<Result<_>>()?;

    let warp_channel = |i: usize| -> Volume {
        debug!(channel = %labels[i], "Warping channel");
        warp_volume(&stack.channel(i), transforms[i])
    };

    let warped: Vec<Volume> = if channels >= PARALLEL_CHANNEL_THRESHOLD {
        (0..channels).into_par_iter().map(warp_channel).collect()
    } else {
        (0..channels).map(warp_channel).collect()
    };

    let mut data = Array4::<f64>::zeros(stack.data.dim());
    for (i, volume) in warped.into_iter().enumerate() {
        data.index_axis_mut(Axis(0), i).assign(&volume.data);
    }

    Ok(MultichannelVolume::new(data, stack.dtype))
}
