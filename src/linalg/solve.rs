//! Strategy selection and the solve routine.

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// Relative cutoff for small singular values in the pseudo-inverse,
/// scaled by the largest singular value.
const PINV_RCOND: f64 = 1e-15;

/// Numerical strategy for solving a square linear system.
///
/// # Examples
///
/// ```
/// use u_kktpm::linalg::SolveMethod;
///
/// let method: SolveMethod = "svd".parse().unwrap();
/// assert_eq!(method, SolveMethod::Svd);
/// assert_eq!(SolveMethod::default(), SolveMethod::Qr);
/// assert!("cholesky".parse::<SolveMethod>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolveMethod {
    /// Direct elimination (LU decomposition with partial pivoting).
    ///
    /// Fastest, least robust to ill-conditioning.
    Elimination,

    /// QR decomposition followed by back-substitution.
    ///
    /// Numerically stable for the repeated re-solves of the KKTPM
    /// correction loop.
    #[default]
    Qr,

    /// Pseudo-inverse built from the singular value decomposition.
    ///
    /// Tolerates rank-deficient systems by discarding tiny singular values.
    Svd,
}

impl SolveMethod {
    /// Canonical lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            SolveMethod::Elimination => "elimination",
            SolveMethod::Qr => "qr",
            SolveMethod::Svd => "svd",
        }
    }
}

impl fmt::Display for SolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolveMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elimination" | "lu" => Ok(SolveMethod::Elimination),
            "qr" => Ok(SolveMethod::Qr),
            "svd" => Ok(SolveMethod::Svd),
            _ => Err(Error::UnknownSolveMethod { name: s.to_string() }),
        }
    }
}

/// Solves the square system `a · u = b`.
///
/// # Errors
///
/// - [`Error::ShapeMismatch`] if `a` is not square or `b` does not match.
/// - [`Error::Singular`] if the decomposition cannot produce a solution.
/// - [`Error::NonFinite`] if any entry of the solution is NaN or infinite.
pub fn solve(a: &DMatrix<f64>, b: &DVector<f64>, method: SolveMethod) -> Result<DVector<f64>> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(Error::shape(
            "linear system matrix",
            format!("{n}x{n}"),
            format!("{}x{}", a.nrows(), a.ncols()),
        ));
    }
    if b.len() != n {
        return Err(Error::shape("right-hand side", n, b.len()));
    }

    let u = match method {
        SolveMethod::Elimination => a.clone().lu().solve(b),
        SolveMethod::Qr => {
            let (q, r) = a.clone().qr().unpack();
            let qtb = q.transpose() * b;
            r.solve_upper_triangular(&qtb)
        }
        SolveMethod::Svd => {
            let svd = a.clone().svd(true, true);
            let cutoff = PINV_RCOND * svd.singular_values.max();
            svd.pseudo_inverse(cutoff).ok().map(|pinv| pinv * b)
        }
    }
    .ok_or(Error::Singular { method })?;

    if u.iter().all(|v| v.is_finite()) {
        Ok(u)
    } else {
        Err(Error::NonFinite { method })
    }
}
