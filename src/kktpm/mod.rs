//! Karush-Kuhn-Tucker proximity measure (KKTPM).
//!
//! Estimates, for each candidate solution, how far it is from satisfying
//! the KKT optimality conditions, without knowledge of the true Pareto
//! front. A value of 0 indicates a KKT point; infeasible solutions score
//! `1 + constraint violation`.
//!
//! # Core Traits
//!
//! - [`Problem`]: batched evaluator of objectives, constraints and gradients
//!
//! # Key Types
//!
//! - [`KktpmConfig`]: utopian shift, augmentation weight, solve strategy
//! - [`Kktpm`]: the estimator
//! - [`KktpmResult`] / [`Estimate`]: batch and per-solution output
//! - [`BoundsAsConstraints`]: exposes variable bounds as constraints
//!
//! # References
//!
//! - Deb & Abouhawwash (2016), "An Optimality Theory-Based Proximity Measure
//!   for Set-Based Multiobjective Optimization"
//! - Abouhawwash, Seada & Deb (2017), "Towards Faster Convergence of
//!   Evolutionary Multi-Criterion Optimization Algorithms using Karush Kuhn
//!   Tucker Optimality Based Local Search"

mod bounds;
mod config;
mod runner;
mod types;

pub use bounds::{fold_bounds, n_bound_constraints, BoundsAsConstraints};
pub use config::KktpmConfig;
pub use runner::Kktpm;
pub use types::{Estimate, Evaluation, KktpmResult, Problem, Snapshot};
