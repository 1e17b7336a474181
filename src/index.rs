//! Unified trait for all metric tree indexes.

use crate::distance::Distance;
use crate::error::{IndexError, Result};
use crate::priority::{PrioritySearcher, PriorityTree};
use crate::searcher::{KnnSearcher, PriorityHandle, RangeSearcher};
use crate::stats::IndexStats;

/// The query side of a search: an external object or an indexed one.
pub enum Query<'q, O> {
    /// Any object of the indexed type, not necessarily in the collection.
    Object(&'q O),
    /// An object of the indexed collection, by identifier.
    Id(u32),
}

impl<O> Clone for Query<'_, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for Query<'_, O> {}

/// Distance from an indexed object to the query, measured object → query.
///
/// The single place where by-object and by-identifier searches differ.
#[inline]
pub(crate) fn query_distance<O, D: Distance<O>>(
    distance: &D,
    data: &[O],
    query: Query<'_, O>,
    id: u32,
) -> f64 {
    let object = &data[id as usize];
    match query {
        Query::Object(q) => distance.distance(object, q),
        Query::Id(q) => distance.distance(object, &data[q as usize]),
    }
}

/// Reject queries the index cannot answer.
pub(crate) fn check_query<O>(built: bool, len: usize, query: &Query<'_, O>) -> Result<()> {
    if !built {
        return Err(IndexError::NotBuilt);
    }
    if let Query::Id(id) = *query {
        if id as usize >= len {
            return Err(IndexError::UnknownId { id, len });
        }
    }
    Ok(())
}

/// Identifiers are `u32` positions into the borrowed collection.
pub(crate) fn check_collection_size(len: usize) -> Result<()> {
    if len > u32::MAX as usize {
        return Err(IndexError::TooManyObjects(len));
    }
    Ok(())
}

/// Build-once, query-many exact search over a metric space.
///
/// All results are `(id, distance)` pairs, where `id` is the position of the
/// object in the collection the index was created over.
pub trait MetricIndex<O>: PriorityTree<O> {
    /// Distance function the tree was built with.
    type Metric: Distance<O>;

    /// Build the tree. Calling it again on a built index does nothing.
    fn build(&mut self) -> Result<()>;

    fn is_built(&self) -> bool;

    /// Number of indexed objects.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn metric(&self) -> &Self::Metric;

    /// The `k` nearest objects in ascending distance order.
    ///
    /// `k` is capped at the collection size; `k == 0` yields nothing.
    fn knn(&self, query: &O, k: usize) -> Result<Vec<(u32, f64)>>;

    /// The `k` nearest objects to an indexed object (which is its own
    /// nearest neighbor at distance 0).
    fn knn_by_id(&self, id: u32, k: usize) -> Result<Vec<(u32, f64)>>;

    /// Every object within `radius` of the query (inclusive), unordered.
    fn range(&self, query: &O, radius: f64) -> Result<Vec<(u32, f64)>>;

    fn range_by_id(&self, id: u32, radius: f64) -> Result<Vec<(u32, f64)>>;

    fn stats(&self) -> IndexStats;

    /// Distance computations performed so far (build and queries).
    fn distance_computations(&self) -> u64;

    fn reset_counter(&self);

    /// Incremental best-first search, positioned on the nearest object.
    fn priority_search<'s>(&'s self, query: &'s O) -> Result<PrioritySearcher<'s, O, Self>>
    where
        Self: Sized,
    {
        let query = Query::Object(query);
        check_query(self.is_built(), self.len(), &query)?;
        Ok(PrioritySearcher::new(self, query))
    }

    fn priority_search_by_id(&self, id: u32) -> Result<PrioritySearcher<'_, O, Self>>
    where
        Self: Sized,
    {
        let query = Query::Id(id);
        check_query(self.is_built(), self.len(), &query)?;
        Ok(PrioritySearcher::new(self, query))
    }

    /// Whether searchers may be handed out for `distance`: it must be a
    /// metric and equal to the distance the tree was built with.
    fn supports(&self, distance: &Self::Metric) -> bool
    where
        Self::Metric: PartialEq,
    {
        distance.is_metric() && distance == self.metric()
    }

    /// kNN searcher bound to `distance`, or `None` if unsupported.
    fn knn_searcher(&self, distance: &Self::Metric) -> Option<KnnSearcher<'_, O, Self>>
    where
        Self: Sized,
        Self::Metric: PartialEq,
    {
        self.supports(distance).then(|| KnnSearcher::new(self))
    }

    /// Range searcher bound to `distance`, or `None` if unsupported.
    fn range_searcher(&self, distance: &Self::Metric) -> Option<RangeSearcher<'_, O, Self>>
    where
        Self: Sized,
        Self::Metric: PartialEq,
    {
        self.supports(distance).then(|| RangeSearcher::new(self))
    }

    /// Priority searcher factory bound to `distance`, or `None` if unsupported.
    fn priority_searcher(&self, distance: &Self::Metric) -> Option<PriorityHandle<'_, O, Self>>
    where
        Self: Sized,
        Self::Metric: PartialEq,
    {
        self.supports(distance).then(|| PriorityHandle::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;

    #[test]
    fn by_id_and_by_object_agree() {
        let data = vec![vec![0.0_f64, 0.0], vec![3.0, 4.0]];
        let a = query_distance(&Euclidean, &data, Query::Id(1), 0);
        let b = query_distance(&Euclidean, &data, Query::Object(&data[1]), 0);
        assert_eq!(a, b);
        assert_eq!(a, 5.0);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let q: Query<'_, Vec<f64>> = Query::Id(3);
        assert_eq!(
            check_query(true, 3, &q),
            Err(IndexError::UnknownId { id: 3, len: 3 })
        );
        assert_eq!(check_query(false, 3, &q), Err(IndexError::NotBuilt));
        assert!(check_query(true, 4, &q).is_ok());
    }
}
