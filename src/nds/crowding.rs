//! Crowding distance for diversity preservation within a front.

/// Points closer than this (Euclidean) to an earlier point are duplicates.
const DUPLICATE_EPSILON: f64 = 1e-24;

/// Crowding distance of each point in a front.
///
/// Higher distance means the point is more isolated in objective space.
///
/// # Algorithm
///
/// For each objective the unique points are sorted by value. A point's
/// contribution is the gap to its predecessor plus the gap to its
/// successor, both normalized by the objective's range; missing neighbours
/// count as infinite gaps, so boundary points end up at `f64::INFINITY`.
/// An objective whose range is zero contributes nothing. The per-objective
/// sums are averaged over the number of objectives.
///
/// With `filter_out_duplicates`, later copies of a point receive 0 and are
/// excluded from the neighbour search. Fronts of one or two points are
/// entirely `f64::INFINITY`.
///
/// # Complexity
///
/// O(m · n · log n), plus O(n²) for duplicate filtering.
///
/// # Example
///
/// ```
/// use u_kktpm::nds::crowding_distance;
///
/// let objectives = vec![
///     vec![1.0, 5.0],
///     vec![3.0, 3.0],
///     vec![5.0, 1.0],
/// ];
///
/// let distances = crowding_distance(&objectives, true);
///
/// assert!(distances[0].is_infinite());
/// assert!(distances[2].is_infinite());
/// assert!((distances[1] - 1.0).abs() < 1e-12);
/// ```
pub fn crowding_distance(objectives: &[Vec<f64>], filter_out_duplicates: bool) -> Vec<f64> {
    let n = objectives.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = objectives[0].len();
    let unique: Vec<usize> = if filter_out_duplicates {
        (0..n)
            .filter(|&i| (0..i).all(|j| euclidean(&objectives[i], &objectives[j]) >= DUPLICATE_EPSILON))
            .collect()
    } else {
        (0..n).collect()
    };

    let mut sums = vec![0.0f64; unique.len()];

    #[allow(clippy::needless_range_loop)] // k is a column index into 2D data
    for k in 0..m {
        let mut order: Vec<usize> = (0..unique.len()).collect();
        order.sort_by(|&a, &b| objectives[unique[a]][k].total_cmp(&objectives[unique[b]][k]));

        let value = |p: usize| objectives[unique[order[p]]][k];
        let last = order.len() - 1;
        let range = value(last) - value(0);
        if range <= 0.0 {
            continue;
        }

        for p in 0..order.len() {
            let to_prev = if p == 0 { f64::INFINITY } else { value(p) - value(p - 1) };
            let to_next = if p == last { f64::INFINITY } else { value(p + 1) - value(p) };
            sums[order[p]] += (to_prev + to_next) / range;
        }
    }

    let mut crowding = vec![0.0f64; n];
    for (u, &i) in unique.iter().enumerate() {
        crowding[i] = sums[u] / m as f64;
    }
    crowding
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_crowding_single() {
        let dist = crowding_distance(&[vec![1.0, 2.0]], true);
        assert_eq!(dist.len(), 1);
        assert!(dist[0].is_infinite());
    }

    #[test]
    fn test_crowding_two() {
        let dist = crowding_distance(&[vec![1.0, 3.0], vec![3.0, 1.0]], true);
        assert!(dist.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_crowding_empty() {
        assert!(crowding_distance(&[], true).is_empty());
    }

    #[test]
    fn test_crowding_evenly_spaced() {
        let objs = vec![
            vec![0.0, 4.0],
            vec![1.0, 3.0],
            vec![2.0, 2.0],
            vec![3.0, 1.0],
            vec![4.0, 0.0],
        ];
        let dist = crowding_distance(&objs, true);

        assert!(dist[0].is_infinite());
        assert!(dist[4].is_infinite());
        // Each objective: (1 + 1) / 4, averaged over two objectives.
        for &d in &dist[1..4] {
            assert_abs_diff_eq!(d, 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_crowding_zero_range_objective() {
        let objs = vec![vec![1.0, 5.0], vec![2.0, 5.0], vec![3.0, 5.0]];
        let dist = crowding_distance(&objs, true);
        assert!(dist[0].is_infinite());
        assert!(dist[2].is_infinite());
        // Only the first objective contributes: (1 + 1) / 2, halved.
        assert_abs_diff_eq!(dist[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_crowding_duplicates_get_zero() {
        let objs = vec![vec![1.0, 1.0], vec![1.0, 1.0], vec![2.0, 0.0], vec![0.0, 2.0]];
        let dist = crowding_distance(&objs, true);
        assert_abs_diff_eq!(dist[0], 1.0, epsilon = 1e-12);
        assert_eq!(dist[1], 0.0);
        assert!(dist[2].is_infinite());
        assert!(dist[3].is_infinite());
    }

    #[test]
    fn test_crowding_duplicates_kept_without_filter() {
        let objs = vec![vec![1.0, 1.0], vec![1.0, 1.0], vec![2.0, 0.0], vec![0.0, 2.0]];
        let dist = crowding_distance(&objs, false);
        // The two copies are neighbours, so each faces a zero gap on every axis.
        assert_abs_diff_eq!(dist[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(dist[1], 0.5, epsilon = 1e-12);
        assert!(dist[2].is_infinite());
        assert!(dist[3].is_infinite());
    }

    #[test]
    fn test_crowding_all_identical() {
        let objs = vec![vec![2.0, 2.0]; 4];
        let dist = crowding_distance(&objs, true);
        assert_eq!(dist, vec![0.0; 4]);
    }

    #[test]
    fn test_sort_then_distance() {
        use crate::nds::non_dominated_sort;

        let objs = vec![
            vec![1.0, 5.0],
            vec![3.0, 3.0],
            vec![5.0, 1.0],
            vec![4.0, 4.0], // dominated
            vec![6.0, 6.0], // dominated
        ];
        let sort_result = non_dominated_sort(&objs);
        let front_0: Vec<Vec<f64>> = sort_result.fronts[0]
            .iter()
            .map(|&i| objs[i].clone())
            .collect();
        let dist = crowding_distance(&front_0, true);

        assert_eq!(dist.len(), 3);
        assert!(dist[0].is_infinite());
        assert!(dist[1].is_finite());
        assert!(dist[2].is_infinite());
    }
}
