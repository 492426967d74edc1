//! Solver parameters.

use crate::error::L0Error;
use crate::float_trait::L0Float;

// =============================================================================
// Constants
// =============================================================================

/// Default smoothing strength. Typical range is [1e-3, 1e-1].
const DEFAULT_LAMBDA: f64 = 2e-2;

/// Default growth rate of the penalty weight. Typical range is (1, 2].
const DEFAULT_KAPPA: f64 = 2.0;

/// Penalty weight at which the iteration stops.
const DEFAULT_BETA_MAX: f64 = 1e5;

// =============================================================================
// Types
// =============================================================================

/// Configuration for L0 gradient smoothing.
///
/// Use `Default::default()` for the standard settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct L0Config<F: L0Float> {
    /// Smoothing strength. Larger values remove more edges. Default: 2e-2
    pub lambda: F,
    /// Multiplier applied to the penalty weight each iteration. Smaller values
    /// mean more iterations and sharper edges. Default: 2.0
    pub kappa: F,
    /// Cutoff for the penalty weight. Default: 1e5
    pub beta_max: F,
}

impl<F: L0Float> Default for L0Config<F> {
    fn default() -> Self {
        Self {
            lambda: F::from_f64_c(DEFAULT_LAMBDA),
            kappa: F::from_f64_c(DEFAULT_KAPPA),
            beta_max: F::from_f64_c(DEFAULT_BETA_MAX),
        }
    }
}

impl<F: L0Float> L0Config<F> {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lambda(mut self, lambda: F) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_kappa(mut self, kappa: F) -> Self {
        self.kappa = kappa;
        self
    }

    pub fn with_beta_max(mut self, beta_max: F) -> Self {
        self.beta_max = beta_max;
        self
    }

    /// Penalty weight of the first iteration, `2 * lambda`.
    pub fn initial_beta(&self) -> F {
        self.lambda + self.lambda
    }

    /// Validate the configuration parameters.
    ///
    /// Rejects any combination for which the schedule would never threshold
    /// or never terminate.
    pub fn validate(&self) -> Result<(), L0Error> {
        if !self.lambda.is_finite() || self.lambda <= F::zero() {
            return Err(L0Error::InvalidParameter(format!(
                "lambda must be finite and > 0, got {:?}",
                self.lambda
            )));
        }
        if !self.kappa.is_finite() || self.kappa <= F::one() {
            return Err(L0Error::InvalidParameter(format!(
                "kappa must be finite and > 1, got {:?}",
                self.kappa
            )));
        }
        if !self.beta_max.is_finite() || self.beta_max <= self.initial_beta() {
            return Err(L0Error::InvalidParameter(format!(
                "beta_max must be finite and > 2 * lambda ({:?}), got {:?}",
                self.initial_beta(),
                self.beta_max
            )));
        }
        Ok(())
    }

    /// Number of half-quadratic iterations the schedule runs.
    ///
    /// Replays the same floating point products as the solver, so it agrees
    /// with the loop exactly. Only meaningful for a validated config.
    pub fn iteration_count(&self) -> usize {
        let mut beta = self.initial_beta();
        let mut count = 0usize;
        while beta < self.beta_max {
            count += 1;
            beta *= self.kappa;
        }
        count
    }
}
