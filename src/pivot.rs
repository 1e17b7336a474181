//! Vantage point selection.
//!
//! Both selectors work on positions `0..n` of a candidate set and take the
//! pairwise distance as a closure, so the trees can feed them whatever
//! scratch layout they build with.
//!
//! - [`select_by_spread`]: single vantage point with the widest distance
//!   distribution (Yianilos' second-moment heuristic).
//! - [`select_farthest`]: `k` well-separated vantage points by greedy
//!   max-min selection over a small random sample (as in k-means++ seeding,
//!   but deterministic after the first pick).

use rand::seq::index;
use rand::Rng;
use smallvec::SmallVec;

/// Pick the candidate whose distances to a random sample spread the most.
///
/// Draws `min(sample_size, n)` candidates; for each, draws a second sample
/// of the same size and scores the candidate by the second moment of its
/// distances around their median. Ties keep the first candidate reaching the
/// maximum. With `sample_size == 1` the pick is uniform at random and no
/// distance is computed.
///
/// # Panics
///
/// Panics if `n == 0`; callers never recurse into empty sets.
pub fn select_by_spread<R, F>(n: usize, sample_size: usize, mut dist: F, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
    F: FnMut(usize, usize) -> f64,
{
    assert!(n > 0, "vantage point selection on an empty set");
    if sample_size <= 1 || n == 1 {
        return rng.random_range(0..n);
    }

    let s = sample_size.min(n);
    let candidates = index::sample(rng, n, s);
    let mut scratch = Vec::with_capacity(s);

    let mut best = candidates.index(0);
    let mut best_spread = f64::NEG_INFINITY;
    for c in candidates.iter() {
        scratch.clear();
        scratch.extend(index::sample(rng, n, s).iter().map(|j| dist(c, j)));
        let spread = second_moment(&mut scratch);
        if spread > best_spread {
            best_spread = spread;
            best = c;
        }
    }
    best
}

/// Second moment of `values` around their median. Reorders `values`.
fn second_moment(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mid = values.len() / 2;
    let (_, median, _) = values.select_nth_unstable_by(mid, f64::total_cmp);
    let median = *median;
    let sum: f64 = values.iter().map(|d| (d - median) * (d - median)).sum();
    sum / values.len() as f64
}

/// Pick up to `k` distinct, well-separated candidates.
///
/// Samples `min(3k, n)` candidates, seeds with one of them at random, then
/// repeatedly adds the sample member farthest from its nearest chosen
/// vantage point. The nearest-chosen distance of each remaining sample member
/// is maintained incrementally, so each pick costs one distance per member.
/// Returns `min(k, n)` positions in selection order.
pub fn select_farthest<R, F>(n: usize, k: usize, mut dist: F, rng: &mut R) -> SmallVec<[usize; 16]>
where
    R: Rng + ?Sized,
    F: FnMut(usize, usize) -> f64,
{
    let k = k.min(n);
    let mut chosen = SmallVec::new();
    if k == 0 {
        return chosen;
    }

    let mut sample = index::sample(rng, n, (3 * k).min(n)).into_vec();
    let first = sample.remove(rng.random_range(0..sample.len()));
    chosen.push(first);

    // (position, distance to nearest chosen vantage point)
    let mut nearest: Vec<(usize, f64)> = sample.into_iter().map(|c| (c, dist(first, c))).collect();

    while chosen.len() < k {
        let mut best = 0;
        let mut dbest = f64::NEG_INFINITY;
        for (i, &(_, d)) in nearest.iter().enumerate() {
            if d > dbest {
                dbest = d;
                best = i;
            }
        }
        let (pick, _) = nearest.remove(best);
        chosen.push(pick);
        for (c, d) in nearest.iter_mut() {
            let nd = dist(pick, *c);
            if nd < *d {
                *d = nd;
            }
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line(points: &[f64]) -> impl Fn(usize, usize) -> f64 + '_ {
        move |a, b| (points[a] - points[b]).abs()
    }

    #[test]
    fn farthest_returns_distinct_positions() {
        let points: Vec<f64> = (0..50).map(f64::from).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let picks = select_farthest(points.len(), 5, line(&points), &mut rng);
        assert_eq!(picks.len(), 5);
        let mut sorted = picks.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
    }

    #[test]
    fn farthest_caps_at_set_size() {
        let points = [0.0, 1.0, 2.0];
        let mut rng = StdRng::seed_from_u64(1);
        let picks = select_farthest(3, 10, line(&points), &mut rng);
        assert_eq!(picks.len(), 3);
    }

    #[test]
    fn farthest_second_pick_is_far_from_first() {
        // two tight clusters: the second pick must come from the other one
        let points = [0.0, 0.1, 0.2, 100.0, 100.1, 100.2];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picks = select_farthest(points.len(), 2, line(&points), &mut rng);
            let gap = (points[picks[0]] - points[picks[1]]).abs();
            assert!(gap > 50.0, "seed {seed}: picks {picks:?}");
        }
    }

    #[test]
    fn spread_prefers_extreme_points_on_a_line() {
        // the endpoints of a line see the widest spread of distances
        let points: Vec<f64> = (0..9).map(f64::from).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let pick = select_by_spread(points.len(), 9, line(&points), &mut rng);
        assert!(pick == 0 || pick == 8, "picked {pick}");
    }

    #[test]
    fn spread_with_unit_sample_is_random_and_free() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut calls = 0;
        let pick = select_by_spread(
            10,
            1,
            |_, _| {
                calls += 1;
                0.0
            },
            &mut rng,
        );
        assert!(pick < 10);
        assert_eq!(calls, 0);
    }

    #[test]
    fn second_moment_of_constant_is_zero() {
        let mut v = vec![2.0; 5];
        assert_eq!(second_moment(&mut v), 0.0);
    }
}
