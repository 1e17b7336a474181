//! Searcher handles validated against a distance function.
//!
//! A handle can only be obtained through [`MetricIndex::knn_searcher`] and
//! friends, which refuse (return `None`) when the distance offered is not the
//! one the tree was built with or is not a metric. Callers use that as the
//! signal to fall back to a linear scan.

use std::marker::PhantomData;

use crate::error::Result;
use crate::index::MetricIndex;
use crate::priority::PrioritySearcher;

/// kNN searcher over one index.
pub struct KnnSearcher<'a, O, I> {
    index: &'a I,
    _marker: PhantomData<fn(&O)>,
}

impl<'a, O, I: MetricIndex<O>> KnnSearcher<'a, O, I> {
    pub(crate) fn new(index: &'a I) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    pub fn knn(&self, query: &O, k: usize) -> Result<Vec<(u32, f64)>> {
        self.index.knn(query, k)
    }

    pub fn knn_by_id(&self, id: u32, k: usize) -> Result<Vec<(u32, f64)>> {
        self.index.knn_by_id(id, k)
    }
}

/// Range searcher over one index.
pub struct RangeSearcher<'a, O, I> {
    index: &'a I,
    _marker: PhantomData<fn(&O)>,
}

impl<'a, O, I: MetricIndex<O>> RangeSearcher<'a, O, I> {
    pub(crate) fn new(index: &'a I) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    pub fn range(&self, query: &O, radius: f64) -> Result<Vec<(u32, f64)>> {
        self.index.range(query, radius)
    }

    pub fn range_by_id(&self, id: u32, radius: f64) -> Result<Vec<(u32, f64)>> {
        self.index.range_by_id(id, radius)
    }
}

/// Starts priority searches over one index.
pub struct PriorityHandle<'a, O, I> {
    index: &'a I,
    _marker: PhantomData<fn(&O)>,
}

impl<'a, O, I: MetricIndex<O>> PriorityHandle<'a, O, I> {
    pub(crate) fn new(index: &'a I) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    pub fn search(&self, query: &'a O) -> Result<PrioritySearcher<'a, O, I>> {
        self.index.priority_search(query)
    }

    pub fn search_by_id(&self, id: u32) -> Result<PrioritySearcher<'a, O, I>> {
        self.index.priority_search_by_id(id)
    }
}
