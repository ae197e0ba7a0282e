//! Dense linear system solving.
//!
//! Small square systems `A·u = b` are solved with one of three
//! interchangeable strategies selected by [`SolveMethod`]:
//!
//! - [`SolveMethod::Elimination`]: LU with partial pivoting
//! - [`SolveMethod::Qr`]: `A = Q·R`, then back-substitution on `R·u = Qᵗ·b`
//! - [`SolveMethod::Svd`]: Moore-Penrose pseudo-inverse from the SVD
//!
//! Singular matrices and non-finite results are reported as errors and
//! never replaced by zeros.

mod solve;

pub use solve::{solve, SolveMethod};
