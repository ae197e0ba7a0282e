//! Convergence analysis for multi-objective evolutionary optimization.
//!
//! Two services, invoked once per generation by a surrounding
//! evolutionary loop:
//!
//! - **KKTPM**: an approximate optimality measure per solution that does
//!   not require the true Pareto front ([`kktpm`]).
//! - **Non-dominated sorting**: Pareto ranking of a population into
//!   ordered fronts, plus crowding distance ([`nds`]).
//!
//! Both are independent of each other. The estimator relies on a small
//! dense linear solver ([`linalg`]) with selectable strategy.
//!
//! # Architecture
//!
//! Like the other U-Engine algorithm crates, this crate contains no
//! population management or genetic operators; problems plug in through
//! the [`kktpm::Problem`] trait and objective matrices are plain
//! `&[Vec<f64>]`.
//!
//! # Features
//!
//! - `parallel` (default): score solutions and fill domination matrices
//!   on rayon's thread pool.
//! - `serde`: `Serialize`/`Deserialize` for configuration types.

pub mod error;
pub mod kktpm;
pub mod linalg;
pub mod nds;

pub use error::{Error, Result};
