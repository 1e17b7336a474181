//! Distance bounds used for pruning.
//!
//! A subtree can be skipped when the query's distance interval to a vantage
//! point, widened by the current search radius, does not intersect the range
//! of distances that vantage point has to the subtree's members:
//!
//! ```text
//! [x - r, x + r] ∩ [low, high] = ∅   ⟹   no member within r of the query
//! ```
//!
//! By the triangle inequality every member `y` satisfies
//! `d(q, y) >= max(x - high, low - x)`, which is also the key used to order
//! branches in priority search.

/// Closed-interval intersection test: `[l1,u1] ∩ [l2,u2] ≠ ∅`.
#[inline]
pub fn intersect(l1: f64, u1: f64, l2: f64, u2: f64) -> bool {
    l1 <= u2 && l2 <= u1
}

/// Lower bound on `d(q, y)` for any `y` with `d(p, y) ∈ [low, high]`,
/// given `x = d(q, p)`.
#[inline]
pub fn min_dist(x: f64, low: f64, high: f64) -> f64 {
    (x - high).max(low - x).max(0.0)
}

/// Scalar min/max distance from one reference point to a set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub low: f64,
    pub high: f64,
}

impl Bounds {
    /// The empty range: nothing intersects it.
    pub const EMPTY: Bounds = Bounds {
        low: f64::INFINITY,
        high: -1.0,
    };

    /// Every non-negative distance: no information (used for roots).
    pub const UNBOUNDED: Bounds = Bounds {
        low: 0.0,
        high: f64::INFINITY,
    };

    /// Bounds of a set of distances.
    pub fn of(distances: impl IntoIterator<Item = f64>) -> Self {
        let mut b = Self::EMPTY;
        for d in distances {
            b.extend(d);
        }
        b
    }

    #[inline]
    pub fn extend(&mut self, d: f64) {
        if d < self.low {
            self.low = d;
        }
        if d > self.high {
            self.high = d;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }

    /// Whether a member could lie within `radius` of a query at distance `x`
    /// from the reference point.
    #[inline]
    pub fn admits(&self, x: f64, radius: f64) -> bool {
        intersect(x - radius, x + radius, self.low, self.high)
    }

    #[inline]
    pub fn min_dist(&self, x: f64) -> f64 {
        min_dist(x, self.low, self.high)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Per-node `m × m` table of distance ranges.
///
/// Entry `(i, j)` holds the min/max distance from vantage point `i` to the
/// members of cell `j`. Stored as two flat row-major arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundTable {
    m: usize,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl BoundTable {
    /// Table for `m` vantage points with every cell empty.
    pub fn new(m: usize) -> Self {
        Self {
            m,
            lower: vec![f64::INFINITY; m * m],
            upper: vec![-1.0; m * m],
        }
    }

    /// Number of vantage points (and cells).
    pub fn size(&self) -> usize {
        self.m
    }

    #[inline]
    pub fn lower(&self, i: usize, j: usize) -> f64 {
        self.lower[i * self.m + j]
    }

    #[inline]
    pub fn upper(&self, i: usize, j: usize) -> f64 {
        self.upper[i * self.m + j]
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Bounds {
        Bounds {
            low: self.lower(i, j),
            high: self.upper(i, j),
        }
    }

    /// Record that vantage point `i` is at distance `d` from a member of cell `j`.
    #[inline]
    pub fn extend(&mut self, i: usize, j: usize, d: f64) {
        let k = i * self.m + j;
        if d < self.lower[k] {
            self.lower[k] = d;
        }
        if d > self.upper[k] {
            self.upper[k] = d;
        }
    }

    /// Whether cell `j` can hold a point within `radius` of the query, as
    /// seen from vantage point `i` at query distance `x`.
    #[inline]
    pub fn admits(&self, i: usize, j: usize, x: f64, radius: f64) -> bool {
        intersect(x - radius, x + radius, self.lower(i, j), self.upper(i, j))
    }

    /// Lower bound on the query distance to any member of cell `j`, combining
    /// the evidence of every vantage point. `dists[i]` is `d(q, vp_i)`.
    pub fn cell_min_dist(&self, j: usize, dists: &[f64]) -> f64 {
        dists
            .iter()
            .enumerate()
            .map(|(i, &x)| min_dist(x, self.lower(i, j), self.upper(i, j)))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_is_closed() {
        assert!(intersect(0.0, 1.0, 1.0, 2.0));
        assert!(!intersect(0.0, 0.999, 1.0, 2.0));
        assert!(intersect(1.5, 1.5, 1.0, 2.0));
    }

    #[test]
    fn empty_bounds_admit_nothing() {
        let b = Bounds::EMPTY;
        assert!(b.is_empty());
        assert!(!b.admits(0.0, f64::MAX));
        let t = BoundTable::new(3);
        assert!(!t.admits(1, 2, 5.0, 100.0));
    }

    #[test]
    fn bounds_of_distances() {
        let b = Bounds::of([2.0, 0.5, 3.5]);
        assert_eq!(b, Bounds { low: 0.5, high: 3.5 });
        assert_eq!(b.min_dist(5.0), 1.5);
        assert!(Bounds::of([]).is_empty());
        assert_eq!(Bounds::UNBOUNDED.min_dist(123.0), 0.0);
    }

    #[test]
    fn extend_tracks_min_and_max() {
        let mut t = BoundTable::new(2);
        t.extend(0, 1, 3.0);
        t.extend(0, 1, 1.0);
        t.extend(0, 1, 2.0);
        assert_eq!(t.get(0, 1), Bounds { low: 1.0, high: 3.0 });
        assert!(t.get(1, 0).is_empty());
        // query at 5 with radius 1 cannot reach [1, 3]
        assert!(!t.admits(0, 1, 5.0, 1.0));
        assert!(t.admits(0, 1, 5.0, 2.0));
    }

    #[test]
    fn min_dist_is_triangle_bound() {
        // shell [2, 4] around the reference point
        assert_eq!(min_dist(0.5, 2.0, 4.0), 1.5);
        assert_eq!(min_dist(3.0, 2.0, 4.0), 0.0);
        assert_eq!(min_dist(7.0, 2.0, 4.0), 3.0);
    }

    #[test]
    fn cell_min_dist_takes_strongest_pivot() {
        let mut t = BoundTable::new(2);
        t.extend(0, 0, 1.0);
        t.extend(1, 0, 10.0);
        // far from vp1's shell, close to vp0's
        assert_eq!(t.cell_min_dist(0, &[1.0, 4.0]), 6.0);
    }
}
