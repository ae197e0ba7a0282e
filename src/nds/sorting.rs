//! Non-dominated sorting engine.
//!
//! Partitions a population into ordered Pareto fronts. Front 0 holds the
//! solutions no other solution dominates; front `k` is the non-dominated
//! set left after removing fronts `0..k`.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - Zhang et al. (2015), "An Efficient Approach to Nondominated Sorting for
//!   Evolutionary Multiobjective Optimization"

use std::cmp::Ordering;

use tracing::debug;

use super::config::{SortConfig, SortMethod};
use super::dominance::{compare, first_front, objective_width, Dominance, DominationMatrix};
use crate::error::Result;

/// Rank assigned to solutions left out by an early stop.
pub const UNRANKED: usize = usize::MAX;

/// Result of non-dominated sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NondominatedSortResult {
    /// Indices grouped by front: `fronts[0]` contains rank-0 indices, etc.
    pub fronts: Vec<Vec<usize>>,

    /// Pareto rank for each solution (0 = front), when requested.
    ///
    /// Solutions not reached because of an early stop hold [`UNRANKED`].
    pub ranks: Option<Vec<usize>>,
}

/// Scatters front indices onto their members.
///
/// Solutions that appear in no front get [`UNRANKED`].
pub fn ranks_from_fronts(fronts: &[Vec<usize>], n: usize) -> Vec<usize> {
    let mut ranks = vec![UNRANKED; n];
    for (k, front) in fronts.iter().enumerate() {
        for &i in front {
            ranks[i] = k;
        }
    }
    ranks
}

/// Sorting engine with fixed configuration.
///
/// # Example
///
/// ```
/// use u_kktpm::nds::{NonDominatedSorting, SortConfig};
///
/// let sorter = NonDominatedSorting::new(SortConfig::default().with_return_rank(true)).unwrap();
/// let objectives = vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![3.0, 3.0], vec![1.0, 1.0]];
/// let result = sorter.sort(&objectives).unwrap();
///
/// assert_eq!(result.fronts, vec![vec![3], vec![0, 1], vec![2]]);
/// assert_eq!(result.ranks, Some(vec![1, 1, 2, 0]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NonDominatedSorting {
    config: SortConfig,
}

impl NonDominatedSorting {
    /// Creates a sorter after validating `config`.
    pub fn new(config: SortConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Sorts `objectives` (one row per solution, all objectives minimized).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) if rows
    /// differ in length.
    pub fn sort(&self, objectives: &[Vec<f64>]) -> Result<NondominatedSortResult> {
        objective_width(objectives)?;
        let n = objectives.len();
        let epsilon = self.config.epsilon;

        let fronts = if n == 0 {
            Vec::new()
        } else if self.config.only_non_dominated_front {
            vec![first_front(objectives, objectives, epsilon)]
        } else {
            let n_stop = self.config.n_stop_if_ranked.unwrap_or(usize::MAX);
            match self.config.method {
                SortMethod::FastNonDominatedSort => fast_non_dominated_sort(objectives, epsilon, n_stop),
                SortMethod::EfficientNonDominatedSort => {
                    efficient_non_dominated_sort(objectives, epsilon, n_stop)
                }
            }
        };

        debug!(
            n_solutions = n,
            n_fronts = fronts.len(),
            method = %self.config.method,
            "non-dominated sort finished"
        );

        let ranks = self
            .config
            .return_rank
            .then(|| ranks_from_fronts(&fronts, n));

        Ok(NondominatedSortResult { fronts, ranks })
    }
}

/// Fast non-dominated sorting with default settings.
///
/// Assigns a Pareto rank to each solution. All objectives are **minimized**.
///
/// # Panics
///
/// Panics if inner slices have inconsistent lengths.
///
/// # Example
///
/// ```
/// use u_kktpm::nds::non_dominated_sort;
///
/// let objectives = vec![
///     vec![1.0, 5.0],  // Solution A
///     vec![3.0, 3.0],  // Solution B
///     vec![5.0, 1.0],  // Solution C
///     vec![4.0, 4.0],  // Solution D — dominated by B
/// ];
///
/// let result = non_dominated_sort(&objectives);
/// let ranks = result.ranks.unwrap();
///
/// assert_eq!(ranks, vec![0, 0, 0, 1]);
/// assert_eq!(result.fronts, vec![vec![0, 1, 2], vec![3]]);
/// ```
pub fn non_dominated_sort(objectives: &[Vec<f64>]) -> NondominatedSortResult {
    let m = objectives.first().map_or(0, Vec::len);
    assert!(
        objectives.iter().all(|o| o.len() == m),
        "all objective vectors must have the same length"
    );
    let fronts = if objectives.is_empty() {
        Vec::new()
    } else {
        fast_non_dominated_sort(objectives, 0.0, usize::MAX)
    };
    let ranks = Some(ranks_from_fronts(&fronts, objectives.len()));
    NondominatedSortResult { fronts, ranks }
}

/// Keeps adding fronts while fewer than `n_stop` solutions are ranked.
fn keep_next_front(n_ranked: usize, n_stop: usize) -> bool {
    n_ranked < n_stop
}

fn fast_non_dominated_sort(objectives: &[Vec<f64>], epsilon: f64, n_stop: usize) -> Vec<Vec<usize>> {
    let n = objectives.len();
    let matrix = DominationMatrix::build(objectives, objectives, epsilon);

    let mut domination_count: Vec<usize> = (0..n)
        .map(|i| matrix.row(i).iter().filter(|&&d| d == Dominance::DominatedBy).count())
        .collect();
    let dominated: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            matrix
                .row(i)
                .iter()
                .enumerate()
                .filter(|&(_, &d)| d == Dominance::Dominates)
                .map(|(j, _)| j)
                .collect()
        })
        .collect();

    let front_0: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();
    let mut n_ranked = front_0.len();
    let mut fronts = vec![front_0];

    while keep_next_front(n_ranked, n_stop) {
        let mut next_front = Vec::new();
        if let Some(current) = fronts.last() {
            for &i in current {
                for &j in &dominated[i] {
                    domination_count[j] -= 1;
                    if domination_count[j] == 0 {
                        next_front.push(j);
                    }
                }
            }
        }

        if next_front.is_empty() {
            break;
        }
        next_front.sort_unstable();
        n_ranked += next_front.len();
        fronts.push(next_front);
    }

    fronts
}

/// Lexicographic order with `-0.0` and `0.0` treated as equal.
fn lexicographic(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x + 0.0).total_cmp(&(y + 0.0)))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn efficient_non_dominated_sort(
    objectives: &[Vec<f64>],
    epsilon: f64,
    n_stop: usize,
) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..objectives.len()).collect();
    order.sort_by(|&a, &b| lexicographic(&objectives[a], &objectives[b]));

    // A solution can only be dominated by solutions that precede it.
    let mut fronts: Vec<Vec<usize>> = Vec::new();
    for s in order {
        let target = fronts.iter().position(|front| {
            !front
                .iter()
                .rev()
                .any(|&m| compare(&objectives[m], &objectives[s], epsilon) == Dominance::Dominates)
        });
        match target {
            Some(k) => fronts[k].push(s),
            None => fronts.push(vec![s]),
        }
    }

    let mut n_ranked = 0;
    let mut kept = 0;
    for front in &fronts {
        n_ranked += front.len();
        kept += 1;
        if !keep_next_front(n_ranked, n_stop) {
            break;
        }
    }
    fronts.truncate(kept);
    fronts
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::nds::find_non_dominated;
    use proptest::prelude::*;

    fn sorter(config: SortConfig) -> NonDominatedSorting {
        NonDominatedSorting::new(config).unwrap()
    }

    fn sorted_fronts(fronts: &[Vec<usize>]) -> Vec<Vec<usize>> {
        fronts
            .iter()
            .map(|f| {
                let mut f = f.clone();
                f.sort_unstable();
                f
            })
            .collect()
    }

    // ---- Convenience function ----

    #[test]
    fn test_single_solution() {
        let objs = vec![vec![1.0, 2.0]];
        let result = non_dominated_sort(&objs);
        assert_eq!(result.ranks, Some(vec![0]));
        assert_eq!(result.fronts, vec![vec![0]]);
    }

    #[test]
    fn test_empty_population() {
        let result = non_dominated_sort(&[]);
        assert!(result.fronts.is_empty());
        assert_eq!(result.ranks, Some(vec![]));
    }

    #[test]
    fn test_two_non_dominated() {
        let objs = vec![
            vec![1.0, 3.0], // good in obj0, bad in obj1
            vec![3.0, 1.0], // bad in obj0, good in obj1
        ];
        let result = non_dominated_sort(&objs);
        assert_eq!(result.ranks, Some(vec![0, 0]));
        assert_eq!(result.fronts.len(), 1);
    }

    #[test]
    fn test_clear_dominance() {
        let objs = vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 3.0]];
        let result = non_dominated_sort(&objs);
        assert_eq!(result.ranks, Some(vec![0, 1, 2]));
        assert_eq!(result.fronts.len(), 3);
    }

    #[test]
    fn test_mixed_fronts() {
        let objs = vec![
            vec![1.0, 5.0], // front 0
            vec![3.0, 3.0], // front 0
            vec![5.0, 1.0], // front 0
            vec![4.0, 4.0], // dominated by [1]
            vec![6.0, 6.0], // dominated by [3]
        ];
        let result = non_dominated_sort(&objs);
        assert_eq!(result.ranks, Some(vec![0, 0, 0, 1, 2]));
    }

    #[test]
    fn test_all_equal() {
        let objs = vec![vec![2.0, 2.0], vec![2.0, 2.0], vec![2.0, 2.0]];
        let result = non_dominated_sort(&objs);
        // Identical solutions don't dominate each other.
        assert_eq!(result.fronts, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_three_objectives() {
        let objs = vec![
            vec![1.0, 5.0, 3.0],
            vec![3.0, 1.0, 5.0],
            vec![5.0, 3.0, 1.0],
            vec![4.0, 4.0, 4.0], // trades off against each of the others
        ];
        let result = non_dominated_sort(&objs);
        assert_eq!(result.ranks, Some(vec![0, 0, 0, 0]));
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_ragged_panics() {
        non_dominated_sort(&[vec![1.0, 2.0], vec![1.0]]);
    }

    // ---- Engine ----

    #[test]
    fn test_reference_scenario_both_methods() {
        let objs = vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![3.0, 3.0], vec![1.0, 1.0]];
        for method in [SortMethod::FastNonDominatedSort, SortMethod::EfficientNonDominatedSort] {
            let result = sorter(SortConfig::default().with_method(method).with_return_rank(true))
                .sort(&objs)
                .unwrap();
            assert_eq!(sorted_fronts(&result.fronts), vec![vec![3], vec![0, 1], vec![2]]);
            assert_eq!(result.ranks, Some(vec![1, 1, 2, 0]));
        }
    }

    #[test]
    fn test_ranks_omitted_by_default() {
        let objs = vec![vec![1.0, 1.0], vec![2.0, 2.0]];
        let result = sorter(SortConfig::default()).sort(&objs).unwrap();
        assert!(result.ranks.is_none());
        assert_eq!(result.fronts, vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_only_non_dominated_front() {
        let objs = vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![0.5, 3.0], vec![3.0, 3.0]];
        let result = sorter(
            SortConfig::default()
                .with_only_non_dominated_front(true)
                .with_return_rank(true),
        )
        .sort(&objs)
        .unwrap();
        assert_eq!(result.fronts, vec![vec![0, 2]]);
        assert_eq!(result.ranks, Some(vec![0, UNRANKED, 0, UNRANKED]));
    }

    #[test]
    fn test_n_stop_keeps_whole_front() {
        // Fronts: {0,1}, {2,3}, {4}
        let objs = vec![
            vec![1.0, 2.0],
            vec![2.0, 1.0],
            vec![2.0, 3.0],
            vec![3.0, 2.0],
            vec![4.0, 4.0],
        ];
        for method in [SortMethod::FastNonDominatedSort, SortMethod::EfficientNonDominatedSort] {
            let base = SortConfig::default().with_method(method).with_return_rank(true);

            let result = sorter(base.clone().with_n_stop_if_ranked(3)).sort(&objs).unwrap();
            assert_eq!(sorted_fronts(&result.fronts), vec![vec![0, 1], vec![2, 3]]);
            assert_eq!(result.ranks, Some(vec![0, 0, 1, 1, UNRANKED]));

            let result = sorter(base.clone().with_n_stop_if_ranked(2)).sort(&objs).unwrap();
            assert_eq!(sorted_fronts(&result.fronts), vec![vec![0, 1]]);

            let result = sorter(base.clone().with_n_stop_if_ranked(0)).sort(&objs).unwrap();
            assert_eq!(sorted_fronts(&result.fronts), vec![vec![0, 1]]);

            let result = sorter(base.with_n_stop_if_ranked(5)).sort(&objs).unwrap();
            assert_eq!(result.fronts.len(), 3);
        }
    }

    #[test]
    fn test_epsilon_merges_close_solutions() {
        let objs = vec![vec![1.0, 1.0], vec![1.05, 1.05]];
        let strict = sorter(SortConfig::default()).sort(&objs).unwrap();
        assert_eq!(strict.fronts.len(), 2);

        let relaxed = sorter(SortConfig::default().with_epsilon(0.1)).sort(&objs).unwrap();
        assert_eq!(relaxed.fronts, vec![vec![0, 1]]);
    }

    #[test]
    fn test_fast_sort_layers_domination_matrix() {
        let objs = vec![
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![2.0, 2.0],
            vec![0.3, 3.0],
            vec![3.0, 0.3],
        ];
        let eps = 0.5;
        let matrix = DominationMatrix::new(&objs, None, eps).unwrap();
        let result = sorter(SortConfig::default().with_epsilon(eps)).sort(&objs).unwrap();

        assert_eq!(result.fronts, vec![vec![0, 3, 4], vec![1], vec![2]]);
        assert_eq!(result.fronts[0], matrix.non_dominated_rows());
        for pair in result.fronts.windows(2) {
            for &j in &pair[1] {
                assert!(pair[0].iter().any(|&i| matrix.get(i, j) == Dominance::Dominates));
            }
        }
    }

    #[test]
    fn test_ragged_is_shape_mismatch() {
        let err = sorter(SortConfig::default())
            .sort(&[vec![1.0, 2.0], vec![1.0]])
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(NonDominatedSorting::new(SortConfig::default().with_epsilon(-1.0)).is_err());
    }

    #[test]
    fn test_signed_zero_lexicographic_order() {
        // b dominates a although -0.0 sorts before 0.0 under total_cmp.
        let objs = vec![vec![-0.0, 2.0], vec![0.0, 1.0]];
        let result = sorter(SortConfig::default().with_method(SortMethod::EfficientNonDominatedSort))
            .sort(&objs)
            .unwrap();
        assert_eq!(result.fronts, vec![vec![1], vec![0]]);
    }

    // ---- Properties ----

    fn population() -> impl Strategy<Value = Vec<Vec<f64>>> {
        (1usize..4, 0usize..40).prop_flat_map(|(m, n)| {
            // Coarse grid so ties and duplicates occur.
            prop::collection::vec(prop::collection::vec((0i32..6).prop_map(f64::from), m), n)
        })
    }

    proptest! {
        #[test]
        fn prop_fronts_partition_population(objs in population()) {
            let result = sorter(SortConfig::default()).sort(&objs).unwrap();
            let mut seen: Vec<usize> = result.fronts.iter().flatten().copied().collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..objs.len()).collect::<Vec<_>>());
            prop_assert!(result.fronts.iter().all(|f| !f.is_empty()));
        }

        #[test]
        fn prop_front_zero_matches_find_non_dominated(objs in population()) {
            let result = sorter(SortConfig::default()).sort(&objs).unwrap();
            let front_0 = find_non_dominated(&objs, None, 0.0).unwrap();
            if objs.is_empty() {
                prop_assert!(result.fronts.is_empty());
            } else {
                prop_assert_eq!(&result.fronts[0], &front_0);
            }
        }

        #[test]
        fn prop_fronts_are_layered(objs in population()) {
            let result = sorter(SortConfig::default().with_return_rank(true)).sort(&objs).unwrap();
            let ranks = result.ranks.unwrap();
            for (k, front) in result.fronts.iter().enumerate() {
                for &i in front {
                    prop_assert_eq!(ranks[i], k);
                    for &j in front {
                        prop_assert_eq!(compare(&objs[i], &objs[j], 0.0), Dominance::NonComparable);
                    }
                    // Every member past front 0 has a dominator exactly one layer up.
                    if k > 0 {
                        let has_parent = result.fronts[k - 1]
                            .iter()
                            .any(|&p| compare(&objs[p], &objs[i], 0.0) == Dominance::Dominates);
                        prop_assert!(has_parent);
                    }
                }
            }
            // A dominator always sits in a strictly better front.
            for i in 0..objs.len() {
                for j in 0..objs.len() {
                    if compare(&objs[i], &objs[j], 0.0) == Dominance::Dominates {
                        prop_assert!(ranks[i] < ranks[j]);
                    }
                }
            }
        }

        #[test]
        fn prop_methods_agree(objs in population(), eps in prop::sample::select(vec![0.0, 0.5, 1.0])) {
            let fast = sorter(SortConfig::default().with_epsilon(eps)).sort(&objs).unwrap();
            let ens = sorter(
                SortConfig::default()
                    .with_epsilon(eps)
                    .with_method(SortMethod::EfficientNonDominatedSort),
            )
            .sort(&objs)
            .unwrap();
            prop_assert_eq!(sorted_fronts(&fast.fronts), sorted_fronts(&ens.fronts));
        }

        #[test]
        fn prop_n_stop_is_prefix(objs in population(), n_stop in 0usize..45) {
            let full = sorter(SortConfig::default()).sort(&objs).unwrap();
            let stopped = sorter(SortConfig::default().with_n_stop_if_ranked(n_stop))
                .sort(&objs)
                .unwrap();
            prop_assert!(stopped.fronts.len() <= full.fronts.len());
            prop_assert_eq!(&full.fronts[..stopped.fronts.len()], &stopped.fronts[..]);
            if n_stop >= objs.len() {
                prop_assert_eq!(&full.fronts, &stopped.fronts);
            }
            // Every front but the last was needed to reach the threshold.
            let before_last: usize = stopped
                .fronts
                .iter()
                .rev()
                .skip(1)
                .map(Vec::len)
                .sum();
            if stopped.fronts.len() > 1 {
                prop_assert!(before_last < n_stop);
            }
        }
    }
}
