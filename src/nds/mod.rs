//! Pareto dominance and non-dominated sorting.
//!
//! Domain-agnostic utilities for ranking a population of objective
//! vectors, as used by NSGA-II style survival. All objectives are
//! **minimized**.
//!
//! # Components
//!
//! - [`compare`] / [`DominationMatrix`]: pairwise (epsilon-relaxed) dominance
//! - [`find_non_dominated`]: front 0 only, without further layering
//! - [`NonDominatedSorting`]: configurable engine producing ordered fronts
//!   and ranks ([`SortConfig`], [`SortMethod`])
//! - [`non_dominated_sort`]: fast sort with default settings
//! - [`crowding_distance`]: spread of a front in objective space
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - IEEE Transactions on Evolutionary Computation, 6(2), 182-197

mod config;
mod crowding;
mod dominance;
mod sorting;

pub use config::{SortConfig, SortMethod};
pub use crowding::crowding_distance;
pub use dominance::{compare, find_non_dominated, Dominance, DominationMatrix};
pub use sorting::{
    non_dominated_sort, ranks_from_fronts, NonDominatedSorting, NondominatedSortResult, UNRANKED,
};
