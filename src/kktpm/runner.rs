//! KKTPM estimation.
//!
//! [`Kktpm`] scores each solution of a batch independently:
//! feasibility check → scalarization weights → stationarity system →
//! non-negative multipliers → score with boundary correction.

use nalgebra::{DMatrix, DVector};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use super::bounds::fold_bounds;
use super::config::KktpmConfig;
use super::types::{Estimate, KktpmResult, Problem, Snapshot};
use crate::error::{Error, Result};
use crate::linalg::solve;

/// Karush-Kuhn-Tucker proximity measure estimator.
///
/// # Usage
///
/// ```ignore
/// let estimator = Kktpm::new(KktpmConfig::default())?;
/// let result = estimator.calc(&x, &problem, None)?;
/// for (i, score) in result.kktpm.iter().enumerate() {
///     println!("solution {i}: {score}");
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Kktpm {
    config: KktpmConfig,
}

impl Kktpm {
    /// Creates an estimator after validating `config`.
    pub fn new(config: KktpmConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &KktpmConfig {
        &self.config
    }

    /// Scores every row of `x` (one decision vector per row).
    ///
    /// `ideal_point` overrides [`Problem::ideal_point`]; the utopian point
    /// is the ideal point shifted down by `utopian_epsilon`.
    ///
    /// # Errors
    ///
    /// - [`Error::ShapeMismatch`] if `x`, the ideal point, the bounds or
    ///   the problem's evaluation disagree with the problem dimensions.
    /// - [`Error::MissingIdealPoint`] if no ideal point is available.
    /// - [`Error::Problem`] if the problem fails to evaluate.
    /// - [`Error::Singular`] / [`Error::NonFinite`] from the linear solves.
    pub fn calc<P: Problem>(
        &self,
        x: &DMatrix<f64>,
        problem: &P,
        ideal_point: Option<&[f64]>,
    ) -> Result<KktpmResult> {
        let (n, n_var) = x.shape();
        let (n_obj, n_constr) = (problem.n_obj(), problem.n_constr());
        if n_var != problem.n_var() {
            return Err(Error::shape("decision vector length", problem.n_var(), n_var));
        }

        let ideal = match ideal_point {
            Some(z) => z.to_vec(),
            None => problem.ideal_point().ok_or(Error::MissingIdealPoint)?,
        };
        if ideal.len() != n_obj {
            return Err(Error::shape("ideal point", n_obj, ideal.len()));
        }
        let utopian = DVector::from_vec(ideal).add_scalar(-self.config.utopian_epsilon);

        debug!(
            n_solutions = n,
            n_var,
            n_obj,
            n_constr,
            method = %self.config.solve_method,
            "estimating KKTPM"
        );

        let mut eval = problem
            .evaluate(x)
            .map_err(|e| Error::Problem(Box::new(e)))?;
        eval.validate(n, n_var, n_obj, n_constr)?;
        if self.config.var_bounds_as_constraints {
            eval = fold_bounds(eval, x, problem.lower_bounds(), problem.upper_bounds())?;
        }

        let estimates = map_solutions(n, self.config.parallel, |i| {
            self.estimate(&eval.snapshot(x, i), &utopian)
        })?;

        let n_infeasible = estimates.iter().filter(|e| e.multipliers.is_none()).count();
        debug!(n_solutions = n, n_infeasible, "KKTPM estimation finished");

        Ok(estimates.into_iter().collect())
    }

    /// Scores a single solution against the utopian point `utopian`.
    ///
    /// Infeasible solutions (`cv > 0`) score `1 + cv` without touching the
    /// gradients.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `utopian` or the gradients do not
    /// match the snapshot's objective, constraint and decision lengths, and
    /// propagates [`Error::Singular`] and [`Error::NonFinite`] from the solves.
    pub fn estimate(&self, snapshot: &Snapshot, utopian: &DVector<f64>) -> Result<Estimate> {
        let g = &snapshot.g;
        let n_obj = snapshot.f.len();
        let n_constr = g.len();
        let n_var = snapshot.x.len();
        check_snapshot(snapshot, utopian)?;

        if snapshot.cv > 0.0 {
            return Ok(Estimate::infeasible(snapshot.cv));
        }

        let size = n_obj + n_constr;

        // Achievement scalarization weights.
        let diff = &snapshot.f - utopian;
        let norm = diff.norm();
        let weights = diff.map(|d| norm / d);

        let mut weighted = snapshot.df.clone();
        for (k, mut row) in weighted.row_iter_mut().enumerate() {
            row *= weights[k];
        }
        let augment = weighted.row_sum() * self.config.rho;

        // Stacked gradients: augmented objective rows, then constraint rows.
        let mut grad = DMatrix::zeros(size, n_var);
        for k in 0..n_obj {
            grad.row_mut(k).copy_from(&(weighted.row(k) + &augment));
        }
        grad.rows_mut(n_obj, n_constr).copy_from(&snapshot.dg);

        let mut a = &grad * grad.transpose();
        a.view_mut((0, 0), (n_obj, n_obj)).add_scalar_mut(1.0);
        for j in 0..n_constr {
            a[(n_obj + j, n_obj + j)] += g[j] * g[j];
        }
        let b = DVector::from_fn(size, |i, _| if i < n_obj { 1.0 } else { 0.0 });

        let u = self.non_negative_multipliers(a, b)?;
        let u_obj = u.rows(0, n_obj);
        let u_constr = u.rows(n_obj, n_constr);

        let sum_obj = u_obj.sum();
        let stationarity = grad.transpose() * &u;
        let slack = u_constr.component_mul(g);

        let raw = (1.0 - sum_obj).powi(2) + stationarity.norm_squared() + slack.norm_squared();
        let combined = raw - slack.sum();

        let mut kktpm = raw;
        if n_constr > 0 {
            let quadratic: f64 = slack.iter().map(|&s| -s * (1.0 - s)).sum();
            if sum_obj + quadratic > 1.0 {
                let gg = g.norm_squared();
                let gu = g.dot(&u_constr);
                let adjusted = -gu;
                let projected = (raw * gg - gu) / (1.0 + gg);
                kktpm = (raw + adjusted + projected) / 3.0;
            }
        }

        Ok(Estimate {
            kktpm,
            combined,
            multipliers: Some(u),
        })
    }

    /// Solves `a · u = b`, then repeatedly pins negative multipliers to zero
    /// and re-solves until none is negative.
    ///
    /// A pinned index gets an identity row and column and a zero right-hand
    /// side, so it stays at zero; each round pins at least one new index,
    /// which bounds the loop by the number of multipliers.
    fn non_negative_multipliers(&self, mut a: DMatrix<f64>, mut b: DVector<f64>) -> Result<DVector<f64>> {
        let method = self.config.solve_method;
        let mut u = solve(&a, &b, method)?;
        let mut pinned = vec![false; u.len()];

        loop {
            let negative: Vec<usize> = (0..u.len()).filter(|&i| !pinned[i] && u[i] < 0.0).collect();
            if negative.is_empty() {
                return Ok(u);
            }
            trace!(?negative, "pinning negative multipliers");

            for &i in &negative {
                a.row_mut(i).fill(0.0);
                a.column_mut(i).fill(0.0);
                a[(i, i)] = 1.0;
                b[i] = 0.0;
                pinned[i] = true;
            }

            u = solve(&a, &b, method)?;
            for (value, &p) in u.iter_mut().zip(&pinned) {
                if p {
                    *value = 0.0;
                }
            }
        }
    }
}

#[cfg(feature = "parallel")]
fn map_solutions<T, F>(n: usize, parallel: bool, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Send + Sync,
{
    if parallel {
        (0..n).into_par_iter().map(f).collect()
    } else {
        (0..n).map(f).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn map_solutions<T, F>(n: usize, _parallel: bool, f: F) -> Result<Vec<T>>
where
    F: Fn(usize) -> Result<T>,
{
    (0..n).map(f).collect()
}

// ============================================================================
// Tests
// ============================================================================

fn check_snapshot(snapshot: &Snapshot, utopian: &DVector<f64>) -> Result<()> {
    let n_obj = snapshot.f.len();
    let n_var = snapshot.x.len();
    let dims = |(r, c): (usize, usize)| format!("{r}x{c}");

    if utopian.len() != n_obj {
        return Err(Error::shape("utopian point", n_obj, utopian.len()));
    }
    if snapshot.df.shape() != (n_obj, n_var) {
        return Err(Error::shape(
            "objective gradients",
            dims((n_obj, n_var)),
            dims(snapshot.df.shape()),
        ));
    }
    if snapshot.dg.shape() != (snapshot.g.len(), n_var) {
        return Err(Error::shape(
            "constraint gradients",
            dims((snapshot.g.len(), n_var)),
            dims(snapshot.dg.shape()),
        ));
    }
    Ok(())
}
