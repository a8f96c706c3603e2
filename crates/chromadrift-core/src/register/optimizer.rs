use tracing::debug;

use crate::error::Result;
use crate::pipeline::config::RegistrationConfig;

/// Why the optimizer stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Gradient magnitude fell below the tolerance.
    GradientTolerance,
    /// The step length shrank below the minimum step.
    StepTooSmall,
    /// The iteration budget ran out first.
    MaximumIterations,
}

impl StopReason {
    pub fn is_converged(self) -> bool {
        !matches!(self, Self::MaximumIterations)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GradientTolerance => write!(f, "gradient tolerance reached"),
            Self::StepTooSmall => write!(f, "step below minimum"),
            Self::MaximumIterations => write!(f, "maximum iterations reached"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OptimizerOutcome {
    pub position: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub gradient_magnitude: f64,
    pub stop_reason: StopReason,
}

/// Regular-step gradient descent.
///
/// Moves a fixed step length along the negative normalized gradient and
/// multiplies the step by the relaxation factor every time the gradient
/// reverses direction.
#[derive(Clone, Debug)]
pub struct RegularStepGradientDescent {
    pub learning_rate: f64,
    pub min_step: f64,
    pub max_iterations: usize,
    pub gradient_tolerance: f64,
    pub relaxation_factor: f64,
}

impl RegularStepGradientDescent {
    pub fn from_config(config: &RegistrationConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            min_step: config.min_step,
            max_iterations: config.max_iterations,
            gradient_tolerance: config.gradient_tolerance,
            relaxation_factor: config.relaxation_factor,
        }
    }

    /// Minimize starting from `initial`. `evaluate` returns the objective
    /// value and its gradient at a position.
    pub fn minimize<F>(&self, initial: Vec<f64>, mut evaluate: F) -> Result<OptimizerOutcome>
    where
        F: FnMut(&[f64]) -> Result<(f64, Vec<f64>)>,
    {
        let mut position = initial;
        let mut step = self.learning_rate;
        let mut previous_gradient: Option<Vec<f64>> = None;
        let mut value = f64::NAN;
        let mut magnitude = f64::INFINITY;

        for iteration in 0..self.max_iterations {
            let (v, gradient) = evaluate(&position)?;
            value = v;
            magnitude = gradient.iter().map(|g| g * g).sum::<f64>().sqrt();

            if magnitude < self.gradient_tolerance {
                return Ok(self.outcome(position, value, iteration, magnitude, StopReason::GradientTolerance));
            }

            if let Some(prev) = &previous_gradient {
                let dot: f64 = prev.iter().zip(&gradient).map(|(a, b)| a * b).sum();
                if dot < 0.0 {
                    step *= self.relaxation_factor;
                }
            }

            if step < self.min_step {
                return Ok(self.outcome(position, value, iteration, magnitude, StopReason::StepTooSmall));
            }

            for (p, g) in position.iter_mut().zip(&gradient) {
                *p -= step * g / magnitude;
            }
            debug!(iteration, value, step, position = ?position, "Optimizer step");
            previous_gradient = Some(gradient);
        }

        Ok(self.outcome(
            position,
            value,
            self.max_iterations,
            magnitude,
            StopReason::MaximumIterations,
        ))
    }

    fn outcome(
        &self,
        position: Vec<f64>,
        value: f64,
        iterations: usize,
        gradient_magnitude: f64,
        stop_reason: StopReason,
    ) -> OptimizerOutcome {
        OptimizerOutcome {
            position,
            value,
            iterations,
            gradient_magnitude,
            stop_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn optimizer() -> RegularStepGradientDescent {
        RegularStepGradientDescent::from_config(&RegistrationConfig::default())
    }

    #[test]
    fn test_converges_on_quadratic_bowl() {
        let outcome = optimizer()
            .minimize(vec![4.0, -3.0], |p| {
                let value = (p[0] - 1.0).powi(2) + (p[1] + 2.0).powi(2);
                Ok((value, vec![2.0 * (p[0] - 1.0), 2.0 * (p[1] + 2.0)]))
            })
            .unwrap();
        assert!(outcome.stop_reason.is_converged());
        assert!((outcome.position[0] - 1.0).abs() < 1e-3);
        assert!((outcome.position[1] + 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_flat_objective_stops_on_tolerance() {
        let outcome = optimizer()
            .minimize(vec![0.0], |_| Ok((1.0, vec![0.0])))
            .unwrap();
        assert_eq!(outcome.stop_reason, StopReason::GradientTolerance);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_budget_exhaustion_reported() {
        let mut opt = optimizer();
        opt.max_iterations = 5;
        // Constant slope never reverses, so the step never shrinks.
        let outcome = opt.minimize(vec![0.0], |_| Ok((0.0, vec![1.0]))).unwrap();
        assert_eq!(outcome.stop_reason, StopReason::MaximumIterations);
        assert_eq!(outcome.iterations, 5);
        assert!((outcome.position[0] + 5.0).abs() < 1e-12);
    }
}
