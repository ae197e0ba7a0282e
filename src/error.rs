//! Crate-wide error type.

use std::error::Error as StdError;

use thiserror::Error;

use crate::linalg::SolveMethod;

/// Errors raised by the solver, the sorting engine and the KKTPM estimator.
///
/// All failures are contractual or numeric; nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown solve method: {name:?}")]
    UnknownSolveMethod { name: String },

    #[error("unknown sorting method: {name:?}")]
    UnknownSortMethod { name: String },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("no ideal point supplied and the problem does not provide one")]
    MissingIdealPoint,

    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    #[error("matrix is singular under {method} solve")]
    Singular { method: SolveMethod },

    #[error("{method} solve produced a non-finite result")]
    NonFinite { method: SolveMethod },

    #[error("problem evaluation failed")]
    Problem(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn shape(
        what: &'static str,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::ShapeMismatch {
            what,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
