//! Distance-computation instrumentation and index statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts distance computations made by an index.
///
/// Shared by the builder and every searcher of one index. Increments are
/// relaxed atomics, so concurrent searches keep the total exact; the value is
/// instrumentation only and never influences results.
#[derive(Debug, Default)]
pub struct DistanceCounter(AtomicU64);

impl DistanceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Statistics about a metric index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub num_objects: usize,
    pub num_nodes: usize,
    /// Number of node levels; 0 for an unbuilt or empty index.
    pub height: usize,
    pub distance_computations: u64,
    pub algorithm: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_is_shared_across_threads() {
        let counter = DistanceCounter::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        counter.increment();
                    }
                });
            }
        });
        assert_eq!(counter.get(), 4000);
        counter.reset();
        assert_eq!(counter.get(), 0);
    }
}
