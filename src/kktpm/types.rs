//! Problem adapter contract and evaluation data.
//!
//! The estimator treats a problem as an opaque batch evaluator: given
//! decision vectors it returns objective and constraint values, the
//! constraint violation and both gradient tensors.

use std::error::Error as StdError;

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// A multi-objective problem as seen by the KKTPM estimator.
///
/// All objectives are minimized; constraints are of the form `g(x) ≤ 0`.
///
/// # Thread Safety
///
/// `Problem` must be `Send + Sync` so estimator output can be computed on
/// rayon's pool; evaluation itself is called once per batch.
pub trait Problem: Send + Sync {
    /// Error reported by [`evaluate`](Problem::evaluate).
    type Error: StdError + Send + Sync + 'static;

    /// Number of decision variables.
    fn n_var(&self) -> usize;

    /// Number of objectives.
    fn n_obj(&self) -> usize;

    /// Number of inequality constraints.
    fn n_constr(&self) -> usize;

    /// Lower variable bounds (length `n_var`). Non-finite entries are unbounded.
    fn lower_bounds(&self) -> &[f64];

    /// Upper variable bounds (length `n_var`). Non-finite entries are unbounded.
    fn upper_bounds(&self) -> &[f64];

    /// Best known value per objective, if the problem knows it.
    fn ideal_point(&self) -> Option<Vec<f64>> {
        None
    }

    /// Evaluates a batch of decision vectors (one row per solution).
    fn evaluate(&self, x: &DMatrix<f64>) -> std::result::Result<Evaluation, Self::Error>;
}

/// Batched evaluation output.
///
/// Shapes for `n` solutions:
///
/// | field | shape |
/// |-------|-------|
/// | `f`   | `n × n_obj` |
/// | `cv`  | `n` |
/// | `g`   | `n × n_constr` |
/// | `df`  | `n` matrices of `n_obj × n_var` |
/// | `dg`  | `n` matrices of `n_constr × n_var` |
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Objective values.
    pub f: DMatrix<f64>,
    /// Scalar constraint violation (0 when feasible).
    pub cv: DVector<f64>,
    /// Constraint values.
    pub g: DMatrix<f64>,
    /// Objective gradients, one Jacobian per solution.
    pub df: Vec<DMatrix<f64>>,
    /// Constraint gradients, one Jacobian per solution.
    pub dg: Vec<DMatrix<f64>>,
}

impl Evaluation {
    /// Number of solutions in the batch.
    pub fn len(&self) -> usize {
        self.f.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks every field against the expected dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] naming the first offending field.
    pub fn validate(&self, n: usize, n_var: usize, n_obj: usize, n_constr: usize) -> Result<()> {
        let dims = |m: &DMatrix<f64>| format!("{}x{}", m.nrows(), m.ncols());

        if self.f.shape() != (n, n_obj) {
            return Err(Error::shape("objective matrix", format!("{n}x{n_obj}"), dims(&self.f)));
        }
        if self.cv.len() != n {
            return Err(Error::shape("constraint violation", n, self.cv.len()));
        }
        if self.g.shape() != (n, n_constr) {
            return Err(Error::shape("constraint matrix", format!("{n}x{n_constr}"), dims(&self.g)));
        }
        if self.df.len() != n {
            return Err(Error::shape("objective gradient count", n, self.df.len()));
        }
        if let Some(bad) = self.df.iter().find(|d| d.shape() != (n_obj, n_var)) {
            return Err(Error::shape("objective gradient", format!("{n_obj}x{n_var}"), dims(bad)));
        }
        if self.dg.len() != n {
            return Err(Error::shape("constraint gradient count", n, self.dg.len()));
        }
        if let Some(bad) = self.dg.iter().find(|d| d.shape() != (n_constr, n_var)) {
            return Err(Error::shape("constraint gradient", format!("{n_constr}x{n_var}"), dims(bad)));
        }
        Ok(())
    }

    /// Copies out everything known about solution `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range or `x` has fewer rows than the batch.
    pub fn snapshot(&self, x: &DMatrix<f64>, i: usize) -> Snapshot {
        Snapshot {
            x: x.row(i).transpose(),
            f: self.f.row(i).transpose(),
            g: self.g.row(i).transpose(),
            cv: self.cv[i],
            df: self.df[i].clone(),
            dg: self.dg[i].clone(),
        }
    }
}

/// Everything the estimator needs about a single solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Decision vector (`n_var`).
    pub x: DVector<f64>,
    /// Objective vector (`n_obj`).
    pub f: DVector<f64>,
    /// Constraint vector (`n_constr`).
    pub g: DVector<f64>,
    /// Constraint violation.
    pub cv: f64,
    /// Objective gradients (`n_obj × n_var`).
    pub df: DMatrix<f64>,
    /// Constraint gradients (`n_constr × n_var`).
    pub dg: DMatrix<f64>,
}

/// Per-solution estimator output.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Approximate distance from KKT stationarity (0 at a KKT point).
    pub kktpm: f64,

    /// Uncorrected score plus the complementary-slackness residual
    /// `Σ −u_j·g_j`. Equals `kktpm` for infeasible solutions.
    pub combined: f64,

    /// Final non-negative multipliers: objective block first, then
    /// constraints. `None` for infeasible solutions.
    pub multipliers: Option<DVector<f64>>,
}

impl Estimate {
    pub(crate) fn infeasible(cv: f64) -> Self {
        Self {
            kktpm: 1.0 + cv,
            combined: 1.0 + cv,
            multipliers: None,
        }
    }
}

/// Estimator output for a batch, aligned with the input rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KktpmResult {
    /// KKTPM value per solution.
    pub kktpm: Vec<f64>,
    /// Auxiliary combined value per solution.
    pub combined: Vec<f64>,
}

impl FromIterator<Estimate> for KktpmResult {
    fn from_iter<T: IntoIterator<Item = Estimate>>(iter: T) -> Self {
        let (kktpm, combined) = iter.into_iter().map(|e| (e.kktpm, e.combined)).unzip();
        Self { kktpm, combined }
    }
}
