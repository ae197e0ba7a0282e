//! Sorting engine configuration.
//!
//! [`SortConfig`] fixes the dominance relaxation, the layering algorithm
//! and how much of the front sequence is produced.

use std::fmt;
use std::str::FromStr;

use super::dominance::check_epsilon;
use crate::error::{Error, Result};

/// Layering algorithm used by the sorting engine.
///
/// Both produce the same fronts; they differ only in the order of indices
/// within a front and in cost profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SortMethod {
    /// Fast non-dominated sort (Deb et al., 2002).
    ///
    /// Domination counts plus dominated-sets, peeled front by front.
    /// O(m · n²) comparisons; indices within a front are ascending.
    #[default]
    FastNonDominatedSort,

    /// Efficient non-dominated sort with sequential search (Zhang et al., 2015).
    ///
    /// Solutions are visited in lexicographic order and placed into the
    /// first front that holds no dominator. Indices within a front follow
    /// the lexicographic order.
    EfficientNonDominatedSort,
}

impl SortMethod {
    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            SortMethod::FastNonDominatedSort => "fast_non_dominated_sort",
            SortMethod::EfficientNonDominatedSort => "efficient_non_dominated_sort",
        }
    }
}

impl fmt::Display for SortMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast_non_dominated_sort" | "fast" => Ok(SortMethod::FastNonDominatedSort),
            "efficient_non_dominated_sort" | "ens" => Ok(SortMethod::EfficientNonDominatedSort),
            _ => Err(Error::UnknownSortMethod { name: s.to_string() }),
        }
    }
}

/// Configuration for [`NonDominatedSorting`](super::NonDominatedSorting).
///
/// # Examples
///
/// ```
/// use u_kktpm::nds::{SortConfig, SortMethod};
///
/// let config = SortConfig::default()
///     .with_epsilon(1e-6)
///     .with_return_rank(true)
///     .with_n_stop_if_ranked(50);
/// assert_eq!(config.method, SortMethod::FastNonDominatedSort);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortConfig {
    /// Dominance relaxation (≥ 0). A solution must be better by at least
    /// this much in every objective to dominate another.
    pub epsilon: f64,

    /// Layering algorithm.
    pub method: SortMethod,

    /// Also produce the rank array (front index per solution).
    pub return_rank: bool,

    /// Return only front 0, skipping all further layering.
    pub only_non_dominated_front: bool,

    /// Stop producing fronts once at least this many solutions are ranked.
    ///
    /// The front that crosses the threshold is returned whole. `None`
    /// ranks every solution.
    pub n_stop_if_ranked: Option<usize>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.0,
            method: SortMethod::default(),
            return_rank: false,
            only_non_dominated_front: false,
            n_stop_if_ranked: None,
        }
    }
}

impl SortConfig {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_method(mut self, method: SortMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_return_rank(mut self, return_rank: bool) -> Self {
        self.return_rank = return_rank;
        self
    }

    pub fn with_only_non_dominated_front(mut self, only: bool) -> Self {
        self.only_non_dominated_front = only;
        self
    }

    pub fn with_n_stop_if_ranked(mut self, n: usize) -> Self {
        self.n_stop_if_ranked = Some(n);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        check_epsilon(self.epsilon)
    }
}
