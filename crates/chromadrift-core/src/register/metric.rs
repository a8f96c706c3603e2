//! Mattes mutual information between a fixed and a transformed moving volume.
//!
//! Fixed intensities fall into histogram bins with a zero-order kernel;
//! moving intensities are spread over four bins with a cubic B-spline Parzen
//! window, which keeps the metric continuous in the transform parameters.

use ndarray::ArrayView3;

use crate::consts::MIN_OVERLAP_FRACTION;
use crate::error::{ChromaDriftError, Result};
use crate::volume::Volume;
use crate::warp::interpolate::{inside, trilinear_sample};

use super::transform::SpatialTransform;

/// Bins reserved at each end of the histogram for B-spline support.
const PADDING: usize = 2;

/// Smallest histogram that still leaves room for the Parzen window.
const MIN_BINS: usize = 2 * PADDING + 2;

/// Maps intensities to continuous bin coordinates in `[PADDING, bins - PADDING - 1]`.
#[derive(Clone, Copy, Debug)]
struct BinScale {
    min: f64,
    bin_size: f64,
    bins: usize,
}

impl BinScale {
    fn fit(data: &ArrayView3<f64>, bins: usize) -> Self {
        let (lo, hi) = data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = hi - lo;
        let usable = (bins - 2 * PADDING - 1) as f64;
        let bin_size = if range.is_finite() && range > f64::EPSILON {
            range / usable
        } else {
            1.0
        };
        Self {
            min: if lo.is_finite() { lo } else { 0.0 },
            bin_size,
            bins,
        }
    }

    fn position(&self, value: f64) -> f64 {
        ((value - self.min) / self.bin_size + PADDING as f64)
            .clamp(PADDING as f64, (self.bins - PADDING - 1) as f64)
    }
}

/// Cubic B-spline kernel.
fn bspline3(u: f64) -> f64 {
    let a = u.abs();
    if a < 1.0 {
        (4.0 - 6.0 * a * a + 3.0 * a * a * a) / 6.0
    } else if a < 2.0 {
        let t = 2.0 - a;
        t * t * t / 6.0
    } else {
        0.0
    }
}

pub struct MattesMutualInformation<'a> {
    moving: ArrayView3<'a, f64>,
    fixed_dim: (usize, usize, usize),
    fixed_bins: Vec<usize>,
    moving_scale: BinScale,
    bins: usize,
}

impl<'a> MattesMutualInformation<'a> {
    pub fn new(fixed: &'a Volume, moving: &'a Volume, bins: usize) -> Self {
        let bins = bins.max(MIN_BINS);
        let fixed_scale = BinScale::fit(&fixed.data.view(), bins);
        let fixed_bins = fixed
            .data
            .iter()
            .map(|&v| fixed_scale.position(v).floor() as usize)
            .collect();

        Self {
            moving: moving.data.view(),
            fixed_dim: fixed.data.dim(),
            fixed_bins,
            moving_scale: BinScale::fit(&moving.data.view(), bins),
            bins,
        }
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Negated mutual information at `transform`; lower is better.
    ///
    /// Fixed samples that map outside the moving volume are left out. Fails
    /// with `InsufficientOverlap` when too few samples remain.
    pub fn value<T: SpatialTransform>(&self, transform: &T) -> Result<f64> {
        let bins = self.bins;
        let moving_dim = self.moving.dim();
        let (depth, h, w) = self.fixed_dim;
        let total = depth * h * w;

        let mut joint = vec![0.0f64; bins * bins];
        let mut valid = 0usize;
        let mut index = 0usize;

        for z in 0..depth {
            for y in 0..h {
                for x in 0..w {
                    let fixed_bin = self.fixed_bins[index];
                    index += 1;

                    let (mz, my, mx) = transform.map_point(z as f64, y as f64, x as f64);
                    if !inside(moving_dim, mz, my, mx) {
                        continue;
                    }
                    let value = trilinear_sample(&self.moving, mz, my, mx);
                    let t = self.moving_scale.position(value);
                    let base = t.floor() as usize;

                    let row = &mut joint[fixed_bin * bins..(fixed_bin + 1) * bins];
                    for k in base - 1..=(base + 2).min(bins - 1) {
                        row[k] += bspline3(k as f64 - t);
                    }
                    valid += 1;
                }
            }
        }

        if total == 0 || (valid as f64) < MIN_OVERLAP_FRACTION * total as f64 {
            return Err(ChromaDriftError::InsufficientOverlap { valid, total });
        }

        let norm: f64 = joint.iter().sum();
        let mut fixed_marginal = vec![0.0f64; bins];
        let mut moving_marginal = vec![0.0f64; bins];
        for f in 0..bins {
            for m in 0..bins {
                let p = joint[f * bins + m] / norm;
                joint[f * bins + m] = p;
                fixed_marginal[f] += p;
                moving_marginal[m] += p;
            }
        }

        let mut mi = 0.0;
        for f in 0..bins {
            if fixed_marginal[f] <= 0.0 {
                continue;
            }
            for m in 0..bins {
                let p = joint[f * bins + m];
                if p > 0.0 {
                    mi += p * (p / (fixed_marginal[f] * moving_marginal[m])).ln();
                }
            }
        }

        Ok(-mi)
    }

    /// Central-difference gradient of [`value`](Self::value) in parameter space.
    pub fn gradient<T: SpatialTransform>(&self, transform: &T, delta: f64) -> Result<Vec<f64>> {
        let params = transform.parameters();
        let mut probe = transform.clone();
        let mut gradient = Vec::with_capacity(params.len());

        for i in 0..params.len() {
            let mut shifted = params.clone();
            shifted[i] = params[i] + delta;
            probe.set_parameters(&shifted);
            let forward = self.value(&probe)?;

            shifted[i] = params[i] - delta;
            probe.set_parameters(&shifted);
            let backward = self.value(&probe)?;

            gradient.push((forward - backward) / (2.0 * delta));
        }

        Ok(gradient)
    }
}
