use ndarray::Array3;
use tracing::{debug, warn};

use crate::consts::GRADIENT_DELTA;
use crate::error::{ChromaDriftError, Result};
use crate::pipeline::config::{RegistrationConfig, TransformModel};
use crate::volume::Volume;
use crate::warp::interpolate::{inside, trilinear_sample};

use super::metric::MattesMutualInformation;
use super::optimizer::{RegularStepGradientDescent, StopReason};
use super::transform::{SpatialTransform, TranslationTransform};

/// Lifecycle of a single registration call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationState {
    Initialized,
    Optimizing,
    Converged,
    Resampled,
    Failed,
}

/// Estimated transform plus the moving volume resampled onto the fixed grid.
#[derive(Clone, Debug)]
pub struct RegistrationResult<T = TranslationTransform> {
    pub transform: T,
    /// Same shape and pixel type as the fixed volume.
    pub resampled: Volume,
    pub iterations: usize,
    pub metric_value: f64,
    pub stop_reason: StopReason,
}

/// Intensity-based pairwise registration: Mattes mutual information
/// optimized with regular-step gradient descent, then linear resampling.
///
/// Holds only configuration, so one engine can serve many independent
/// calls, including concurrent ones.
#[derive(Clone, Debug, Default)]
pub struct PairwiseRegistrationEngine {
    config: RegistrationConfig,
}

impl PairwiseRegistrationEngine {
    pub fn new(config: RegistrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// Register `moving` to `fixed` with the configured transform model.
    pub fn register(&self, fixed: &Volume, moving: &Volume) -> Result<RegistrationResult> {
        match self.config.transform {
            TransformModel::Translation => {
                self.register_with(fixed, moving, TranslationTransform::for_volume(fixed))
            }
        }
    }

    /// Register starting from an explicit initial transform.
    pub fn register_with<T: SpatialTransform>(
        &self,
        fixed: &Volume,
        moving: &Volume,
        initial: T,
    ) -> Result<RegistrationResult<T>> {
        for (role, volume) in [("fixed", fixed), ("moving", moving)] {
            if volume.data.is_empty() {
                return Err(ChromaDriftError::Shape(format!(
                    "{} volume is empty: {:?}",
                    role,
                    volume.data.dim()
                )));
            }
        }
        if fixed.is_planar() != moving.is_planar() {
            return Err(ChromaDriftError::Shape(format!(
                "cannot register a {:?} volume against a {:?} volume",
                moving.data.dim(),
                fixed.data.dim()
            )));
        }

        let mut state = RegistrationState::Initialized;
        debug!(?state, fixed = ?fixed.data.dim(), moving = ?moving.data.dim(), "Registration");

        let metric = MattesMutualInformation::new(fixed, moving, self.config.histogram_bins);
        let optimizer = RegularStepGradientDescent::from_config(&self.config);

        state = RegistrationState::Optimizing;
        debug!(?state, bins = metric.bins(), "Registration");

        let outcome = optimizer.minimize(initial.parameters(), |params| {
            let mut probe = initial.clone();
            probe.set_parameters(params);
            let value = metric.value(&probe)?;
            let gradient = metric.gradient(&probe, GRADIENT_DELTA)?;
            Ok((value, gradient))
        });

        let outcome = match outcome {
            Ok(o) if o.stop_reason.is_converged() => o,
            Ok(o) => {
                state = RegistrationState::Failed;
                warn!(
                    ?state,
                    iterations = o.iterations,
                    gradient = o.gradient_magnitude,
                    "Registration did not converge"
                );
                return Err(ChromaDriftError::RegistrationNonConvergence {
                    iterations: o.iterations,
                    gradient_magnitude: o.gradient_magnitude,
                });
            }
            Err(e) => {
                state = RegistrationState::Failed;
                warn!(?state, error = %e, "Registration failed");
                return Err(e);
            }
        };

        state = RegistrationState::Converged;
        debug!(
            ?state,
            iterations = outcome.iterations,
            reason = %outcome.stop_reason,
            params = ?outcome.position,
            "Registration"
        );

        let mut transform = initial;
        transform.set_parameters(&outcome.position);
        let resampled = resample(moving, fixed, &transform);

        state = RegistrationState::Resampled;
        debug!(?state, "Registration");

        Ok(RegistrationResult {
            transform,
            resampled,
            iterations: outcome.iterations,
            metric_value: outcome.value,
            stop_reason: outcome.stop_reason,
        })
    }
}

/// Resample `moving` onto the grid of `reference` through `transform`.
///
/// Linear interpolation; points outside the moving volume become 0. The
/// result takes the reference's shape and pixel type.
pub fn resample<T: SpatialTransform>(moving: &Volume, reference: &Volume, transform: &T) -> Volume {
    let moving_dim = moving.data.dim();
    let view = moving.data.view();
    let dtype = reference.dtype;

    let data = Array3::from_shape_fn(reference.data.dim(), |(z, y, x)| {
        let (mz, my, mx) = transform.map_point(z as f64, y as f64, x as f64);
        if inside(moving_dim, mz, my, mx) {
            dtype.cast(trilinear_sample(&view, mz, my, mx))
        } else {
            0.0
        }
    });

    Volume::new(data, dtype)
}
