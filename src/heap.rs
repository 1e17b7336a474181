//! Bounded result heap for k-nearest-neighbor search.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Result entry for the max-heap (worst result on top).
#[derive(Clone, Copy, PartialEq)]
struct MaxResult {
    id: u32,
    distance: f64,
}

impl Eq for MaxResult {}

impl Ord for MaxResult {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: larger distance = higher priority; ids break ties so the
        // kept set does not depend on insertion order.
        self.distance
            .total_cmp(&other.distance)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for MaxResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keeps the `k` closest candidates seen so far.
///
/// `tau()` is the current k-th best distance (`+∞` until `k` candidates have
/// been seen) and only ever shrinks.
pub struct KnnHeap {
    k: usize,
    results: BinaryHeap<MaxResult>,
}

impl KnnHeap {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            results: BinaryHeap::with_capacity(k + 1),
        }
    }

    /// Offer a candidate; returns the updated pruning threshold.
    #[inline]
    pub fn insert(&mut self, id: u32, distance: f64) -> f64 {
        if self.k == 0 {
            return self.tau();
        }
        let candidate = MaxResult { id, distance };
        if self.results.len() < self.k {
            self.results.push(candidate);
        } else if let Some(worst) = self.results.peek() {
            if candidate < *worst {
                self.results.pop();
                self.results.push(candidate);
            }
        }
        self.tau()
    }

    /// Current k-th best distance.
    #[inline]
    pub fn tau(&self) -> f64 {
        if self.k == 0 {
            return f64::NEG_INFINITY;
        }
        if self.results.len() < self.k {
            return f64::INFINITY;
        }
        self.results.peek().map_or(f64::INFINITY, |r| r.distance)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results in ascending distance order (ties by id).
    pub fn into_sorted_vec(self) -> Vec<(u32, f64)> {
        self.results
            .into_sorted_vec()
            .into_iter()
            .map(|r| (r.id, r.distance))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_k_smallest() {
        let mut heap = KnnHeap::new(3);
        assert_eq!(heap.tau(), f64::INFINITY);
        for (id, d) in [(0, 5.0), (1, 1.0), (2, 4.0), (3, 0.5), (4, 9.0), (5, 2.0)] {
            heap.insert(id, d);
        }
        assert_eq!(heap.tau(), 2.0);
        assert_eq!(heap.into_sorted_vec(), vec![(3, 0.5), (1, 1.0), (5, 2.0)]);
    }

    #[test]
    fn tau_only_shrinks() {
        let mut heap = KnnHeap::new(2);
        let mut last = f64::INFINITY;
        for (id, d) in [(0, 3.0), (1, 7.0), (2, 8.0), (3, 1.0), (4, 2.0)] {
            let tau = heap.insert(id, d);
            assert!(tau <= last);
            last = tau;
        }
        assert_eq!(last, 2.0);
    }

    #[test]
    fn zero_k_accepts_nothing() {
        let mut heap = KnnHeap::new(0);
        heap.insert(0, 1.0);
        assert!(heap.is_empty());
        assert!(heap.into_sorted_vec().is_empty());
    }
}
