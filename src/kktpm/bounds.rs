//! Variable bounds expressed as inequality constraints.
//!
//! Every finite lower bound `xl_i` becomes `xl_i − x_i ≤ 0` with gradient
//! `−e_i`, every finite upper bound `xu_i` becomes `x_i − xu_i ≤ 0` with
//! gradient `+e_i`. Lower-bound rows come first, then upper-bound rows,
//! both appended after the problem's own constraints. Positive values
//! are added to the constraint violation.

use nalgebra::DMatrix;

use super::types::{Evaluation, Problem};
use crate::error::{Error, Result};

/// Indices of finite bounds: `(lower, upper)`.
fn finite_bounds(xl: &[f64], xu: &[f64]) -> (Vec<usize>, Vec<usize>) {
    let lower = (0..xl.len()).filter(|&i| xl[i].is_finite()).collect();
    let upper = (0..xu.len()).filter(|&i| xu[i].is_finite()).collect();
    (lower, upper)
}

/// Number of constraint rows [`fold_bounds`] appends.
pub fn n_bound_constraints(xl: &[f64], xu: &[f64]) -> usize {
    let (lower, upper) = finite_bounds(xl, xu);
    lower.len() + upper.len()
}

/// Appends the bound constraints of `x` to an evaluation.
///
/// `eval` must already match `x` (see [`Evaluation::validate`]).
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the bound vectors do not have one
/// entry per variable.
pub fn fold_bounds(eval: Evaluation, x: &DMatrix<f64>, xl: &[f64], xu: &[f64]) -> Result<Evaluation> {
    let (n, n_var) = x.shape();
    if xl.len() != n_var {
        return Err(Error::shape("lower bounds", n_var, xl.len()));
    }
    if xu.len() != n_var {
        return Err(Error::shape("upper bounds", n_var, xu.len()));
    }

    let (lower, upper) = finite_bounds(xl, xu);
    let n_constr = eval.g.ncols();
    let total = n_constr + lower.len() + upper.len();

    let mut g = DMatrix::zeros(n, total);
    g.columns_mut(0, n_constr).copy_from(&eval.g);
    let mut cv = eval.cv;
    let mut dg = Vec::with_capacity(n);

    for (s, own) in eval.dg.iter().enumerate() {
        let mut grad = DMatrix::zeros(total, n_var);
        grad.rows_mut(0, n_constr).copy_from(own);

        let rows = lower
            .iter()
            .map(|&i| (i, xl[i] - x[(s, i)], -1.0))
            .chain(upper.iter().map(|&i| (i, x[(s, i)] - xu[i], 1.0)));
        for (r, (i, value, slope)) in rows.enumerate() {
            g[(s, n_constr + r)] = value;
            grad[(n_constr + r, i)] = slope;
            cv[s] += value.max(0.0);
        }
        dg.push(grad);
    }

    Ok(Evaluation {
        f: eval.f,
        cv,
        g,
        df: eval.df,
        dg,
    })
}

/// Adapter exposing a problem's variable bounds as ordinary constraints.
///
/// The wrapped problem reports `n_constr + n_bound_constraints` constraints
/// and its evaluations carry the folded rows. Bounds and ideal point are
/// passed through unchanged.
#[derive(Debug, Clone)]
pub struct BoundsAsConstraints<P> {
    inner: P,
    n_folded: usize,
}

impl<P: Problem> BoundsAsConstraints<P> {
    pub fn new(inner: P) -> Self {
        let n_folded = n_bound_constraints(inner.lower_bounds(), inner.upper_bounds());
        Self { inner, n_folded }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: Problem> Problem for BoundsAsConstraints<P> {
    type Error = Error;

    fn n_var(&self) -> usize {
        self.inner.n_var()
    }

    fn n_obj(&self) -> usize {
        self.inner.n_obj()
    }

    fn n_constr(&self) -> usize {
        self.inner.n_constr() + self.n_folded
    }

    fn lower_bounds(&self) -> &[f64] {
        self.inner.lower_bounds()
    }

    fn upper_bounds(&self) -> &[f64] {
        self.inner.upper_bounds()
    }

    fn ideal_point(&self) -> Option<Vec<f64>> {
        self.inner.ideal_point()
    }

    fn evaluate(&self, x: &DMatrix<f64>) -> Result<Evaluation> {
        let eval = self
            .inner
            .evaluate(x)
            .map_err(|e| Error::Problem(Box::new(e)))?;
        eval.validate(
            x.nrows(),
            self.inner.n_var(),
            self.inner.n_obj(),
            self.inner.n_constr(),
        )?;
        fold_bounds(eval, x, self.inner.lower_bounds(), self.inner.upper_bounds())
    }
}
