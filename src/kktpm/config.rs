//! KKTPM estimator configuration.

use crate::error::{Error, Result};
use crate::linalg::SolveMethod;

/// Configuration for the [`Kktpm`](super::Kktpm) estimator.
///
/// # Examples
///
/// ```
/// use u_kktpm::kktpm::KktpmConfig;
/// use u_kktpm::linalg::SolveMethod;
///
/// let config = KktpmConfig::default()
///     .with_solve_method(SolveMethod::Svd)
///     .with_rho(1e-2)
///     .with_var_bounds_as_constraints(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KktpmConfig {
    /// Shift subtracted from every ideal-point component to obtain the
    /// utopian point. Keeps `f − z` away from zero.
    pub utopian_epsilon: f64,

    /// Weight of the augmentation term in the achievement scalarization.
    ///
    /// Keeps every objective's gradient in play when one weight dominates.
    pub rho: f64,

    /// Strategy for the stationarity system solves.
    pub solve_method: SolveMethod,

    /// Fold finite variable bounds into the constraint set before scoring.
    pub var_bounds_as_constraints: bool,

    /// Whether to score solutions in parallel using rayon.
    ///
    /// Has no effect without the `parallel` feature.
    pub parallel: bool,
}

impl Default for KktpmConfig {
    fn default() -> Self {
        Self {
            utopian_epsilon: 1e-4,
            rho: 1e-3,
            solve_method: SolveMethod::default(),
            var_bounds_as_constraints: true,
            parallel: true,
        }
    }
}

impl KktpmConfig {
    pub fn with_utopian_epsilon(mut self, epsilon: f64) -> Self {
        self.utopian_epsilon = epsilon;
        self
    }

    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    pub fn with_solve_method(mut self, method: SolveMethod) -> Self {
        self.solve_method = method;
        self
    }

    pub fn with_var_bounds_as_constraints(mut self, enabled: bool) -> Self {
        self.var_bounds_as_constraints = enabled;
        self
    }

    /// Enables or disables parallel scoring.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.utopian_epsilon.is_finite() || self.utopian_epsilon < 0.0 {
            return Err(Error::InvalidConfig {
                reason: "utopian_epsilon must be finite and non-negative",
            });
        }
        if !self.rho.is_finite() || self.rho < 0.0 {
            return Err(Error::InvalidConfig {
                reason: "rho must be finite and non-negative",
            });
        }
        Ok(())
    }
}
