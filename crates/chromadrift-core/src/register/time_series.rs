use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::info;

use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::error::{ChromaDriftError, Result};
use crate::volume::Volume;

use super::engine::PairwiseRegistrationEngine;
use super::transform::SpatialTransform;

/// One frame of an aligned series.
#[derive(Clone, Debug)]
pub struct AlignedFrame {
    pub volume: Volume,
    /// Estimated translation `[dx, dy(, dz)]`; zeros for the anchor.
    pub translation: Vec<f64>,
    pub iterations: usize,
}

/// Register every frame against frame 0 and return the resampled series.
///
/// Frame 0 is returned unchanged. Frames are registered independently to
/// the same anchor, never chained, so the result is order-preserving no
/// matter how the work is scheduled.
pub fn align_time_series<F>(
    frames: &[Volume],
    engine: &PairwiseRegistrationEngine,
    on_frame_done: F,
) -> Result<Vec<Volume>>
where
    F: Fn(usize) + Send + Sync,
{
    Ok(align_time_series_detailed(frames, engine, on_frame_done)?
        .into_iter()
        .map(|f| f.volume)
        .collect())
}

/// Like [`align_time_series`], also reporting each frame's estimate.
pub fn align_time_series_detailed<F>(
    frames: &[Volume],
    engine: &PairwiseRegistrationEngine,
    on_frame_done: F,
) -> Result<Vec<AlignedFrame>>
where
    F: Fn(usize) + Send + Sync,
{
    let anchor = frames.first().ok_or(ChromaDriftError::EmptySequence)?;
    let counter = AtomicUsize::new(0);

    let align_one = |i: usize| -> Result<AlignedFrame> {
        let frame = if i == 0 {
            AlignedFrame {
                volume: anchor.clone(),
                translation: vec![0.0; if anchor.is_planar() { 2 } else { 3 }],
                iterations: 0,
            }
        } else {
            let result = engine.register(anchor, &frames[i])?;
            info!(
                frame = i,
                dx = result.transform.dx(),
                dy = result.transform.dy(),
                dz = result.transform.dz(),
                iterations = result.iterations,
                "Registered frame"
            );
            AlignedFrame {
                translation: result.transform.parameters(),
                volume: result.resampled,
                iterations: result.iterations,
            }
        };
        let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
        on_frame_done(done);
        Ok(frame)
    };

    let results: Vec<Result<AlignedFrame>> = if frames.len() >= PARALLEL_FRAME_THRESHOLD {
        (0..frames.len()).into_par_iter().map(align_one).collect()
    } else {
        (0..frames.len()).map(align_one).collect()
    };

    results.into_iter().collect()
}
