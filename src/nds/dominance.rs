//! Pareto dominance between objective vectors.
//!
//! All objectives are **minimized**. With a relaxation `epsilon ≥ 0`,
//! `a` dominates `b` iff `a_k ≤ b_k − epsilon` for every objective `k` and
//! `a_k < b_k − epsilon` for at least one.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Error, Result};

/// Outcome of comparing a left objective vector against a right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dominance {
    /// Left dominates right.
    Dominates,
    /// Right dominates left.
    DominatedBy,
    /// Neither dominates the other.
    NonComparable,
}

impl Dominance {
    /// The same relation seen from the right-hand side.
    pub fn reverse(self) -> Self {
        match self {
            Dominance::Dominates => Dominance::DominatedBy,
            Dominance::DominatedBy => Dominance::Dominates,
            Dominance::NonComparable => Dominance::NonComparable,
        }
    }
}

/// Compares two objective vectors for (epsilon-relaxed) Pareto dominance.
///
/// NaN entries make the pair non-comparable.
///
/// # Panics
///
/// Panics if the slices differ in length or `epsilon` is negative or
/// not finite.
///
/// # Example
///
/// ```
/// use u_kktpm::nds::{compare, Dominance};
///
/// assert_eq!(compare(&[1.0, 1.0], &[2.0, 1.0], 0.0), Dominance::Dominates);
/// assert_eq!(compare(&[1.0, 3.0], &[2.0, 1.0], 0.0), Dominance::NonComparable);
/// // Relaxed: a must be better by at least epsilon everywhere.
/// assert_eq!(compare(&[1.0, 1.0], &[2.0, 1.0], 0.5), Dominance::NonComparable);
/// ```
pub fn compare(a: &[f64], b: &[f64], epsilon: f64) -> Dominance {
    assert_eq!(a.len(), b.len(), "objective vectors differ in length");
    assert!(
        epsilon.is_finite() && epsilon >= 0.0,
        "epsilon must be finite and non-negative"
    );

    let mut a_le_all = true;
    let mut a_lt_some = false;
    let mut b_le_all = true;
    let mut b_lt_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va <= vb - epsilon {
            a_lt_some |= va < vb - epsilon;
        } else {
            a_le_all = false;
        }
        if vb <= va - epsilon {
            b_lt_some |= vb < va - epsilon;
        } else {
            b_le_all = false;
        }
        if !a_le_all && !b_le_all {
            return Dominance::NonComparable;
        }
    }

    if a_le_all && a_lt_some {
        Dominance::Dominates
    } else if b_le_all && b_lt_some {
        Dominance::DominatedBy
    } else {
        Dominance::NonComparable
    }
}

/// Pairwise dominance relation between a population and a reference set.
///
/// Entry `(i, j)` is `compare(objectives[i], reference[j], epsilon)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominationMatrix {
    nrows: usize,
    ncols: usize,
    data: Vec<Dominance>,
}

impl DominationMatrix {
    /// Builds the matrix of `objectives` against `reference`.
    ///
    /// When `reference` is `None` the population is compared against
    /// itself. With the `parallel` feature, rows are filled on rayon's pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a negative or non-finite
    /// `epsilon` and [`Error::ShapeMismatch`] for ragged rows or a reference
    /// set with a different objective count.
    pub fn new(objectives: &[Vec<f64>], reference: Option<&[Vec<f64>]>, epsilon: f64) -> Result<Self> {
        let reference = reference.unwrap_or(objectives);
        check_inputs(objectives, reference, epsilon)?;
        Ok(Self::build(objectives, reference, epsilon))
    }

    /// Builds the matrix from inputs that are already validated.
    pub(crate) fn build(objectives: &[Vec<f64>], reference: &[Vec<f64>], epsilon: f64) -> Self {
        let nrows = objectives.len();
        let ncols = reference.len();

        let row = |f: &Vec<f64>| -> Vec<Dominance> {
            reference.iter().map(|r| compare(f, r, epsilon)).collect()
        };

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<Dominance>> = objectives.par_iter().map(row).collect();
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<Dominance>> = objectives.iter().map(row).collect();

        Self {
            nrows,
            ncols,
            data: rows.into_iter().flatten().collect(),
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Relation of row `i` to column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of range.
    pub fn get(&self, i: usize, j: usize) -> Dominance {
        assert!(i < self.nrows && j < self.ncols, "index out of range");
        self.data[i * self.ncols + j]
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[Dominance] {
        &self.data[i * self.ncols..(i + 1) * self.ncols]
    }

    /// Rows that no reference entry dominates (front 0 for self-comparison).
    pub fn non_dominated_rows(&self) -> Vec<usize> {
        (0..self.nrows)
            .filter(|&i| !self.row(i).contains(&Dominance::DominatedBy))
            .collect()
    }
}

/// Indices of `objectives` not dominated by any member of the comparison set.
///
/// The comparison set is `reference` when given, otherwise `objectives`
/// itself. Only the first front is computed; no pairwise matrix is built
/// and each candidate stops at its first dominator.
///
/// # Errors
///
/// Same contract as [`DominationMatrix::new`].
///
/// # Example
///
/// ```
/// use u_kktpm::nds::find_non_dominated;
///
/// let objectives = vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![3.0, 3.0], vec![1.0, 1.0]];
/// assert_eq!(find_non_dominated(&objectives, None, 0.0).unwrap(), vec![3]);
///
/// // Against an external reference set.
/// let reference = vec![vec![0.0, 5.0]];
/// assert_eq!(
///     find_non_dominated(&objectives, Some(&reference[..]), 0.0).unwrap(),
///     vec![0, 1, 2, 3]
/// );
/// ```
pub fn find_non_dominated(
    objectives: &[Vec<f64>],
    reference: Option<&[Vec<f64>]>,
    epsilon: f64,
) -> Result<Vec<usize>> {
    let reference = reference.unwrap_or(objectives);
    check_inputs(objectives, reference, epsilon)?;
    Ok(first_front(objectives, reference, epsilon))
}

pub(crate) fn first_front(objectives: &[Vec<f64>], reference: &[Vec<f64>], epsilon: f64) -> Vec<usize> {
    (0..objectives.len())
        .filter(|&i| {
            !reference
                .iter()
                .any(|r| compare(r, &objectives[i], epsilon) == Dominance::Dominates)
        })
        .collect()
}

pub(crate) fn check_epsilon(epsilon: f64) -> Result<()> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(Error::InvalidConfig {
            reason: "epsilon must be finite and non-negative",
        });
    }
    Ok(())
}

/// Common row length of `objectives`, or an error naming the first ragged row.
pub(crate) fn objective_width(objectives: &[Vec<f64>]) -> Result<usize> {
    let m = objectives.first().map_or(0, Vec::len);
    match objectives.iter().find(|o| o.len() != m) {
        Some(row) => Err(Error::shape("objective row length", m, row.len())),
        None => Ok(m),
    }
}

fn check_inputs(objectives: &[Vec<f64>], reference: &[Vec<f64>], epsilon: f64) -> Result<()> {
    check_epsilon(epsilon)?;
    let m = objective_width(objectives)?;
    let r = objective_width(reference)?;
    if !objectives.is_empty() && !reference.is_empty() && m != r {
        return Err(Error::shape("reference objective count", m, r));
    }
    Ok(())
}
