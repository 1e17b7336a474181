//! Multi-vantage-point tree (MVP-tree).
//!
//! Generalizes the VP-tree from one vantage point per node to `m`: objects
//! are partitioned into the Voronoi cells of `m` well-separated vantage
//! points, and every node stores, for each (vantage point, cell) pair, the
//! min/max distance between them.
//!
//! **Technical Name**: Multi-Vantage-Point Tree
//!
//! # Algorithm
//!
//! - **Vantage points**: greedy farthest-point selection over a sample of
//!   `3m` objects
//! - **Partition**: every non-vantage object goes to its nearest vantage
//!   point's cell; vantage points themselves are stored in the node and
//!   examined on every visit
//! - **Pruning**: cell `j` is skipped when, for any vantage point `i`,
//!   `[d(q, vp_i) - τ, d(q, vp_i) + τ]` misses the recorded range of cell `j`
//! - **Children**: built over non-empty cells only, with
//!   `clamp(m * |cell| / n, 2, 200)` vantage points
//!
//! Compared with [`crate::gnat`], vantage points never take part in cell
//! bounds, so each visit pays for all `m` vantage point distances.
//!
//! # References
//!
//! - Bozkaya & Özsoyoglu (1997): "Distance-based indexing for
//!   high-dimensional metric spaces"

mod construction;
mod search;

use serde::{Deserialize, Serialize};

use crate::distance::Distance;
use crate::error::{IndexError, Result};
use crate::index::{self, check_query, MetricIndex, Query};
use crate::priority::{Frontier, PriorityTree};
use crate::stats::{DistanceCounter, IndexStats};
use crate::voronoi::VoronoiTree;

/// MVP-tree parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MVPTreeParams {
    /// Vantage points of the root node.
    pub num_vantage_points: usize,

    /// Subsets of at most this many objects become leaves.
    pub leaf_size: usize,

    /// Nodes at this depth become leaves regardless of size.
    pub max_depth: usize,

    /// Seed for vantage point sampling; drawn from entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for MVPTreeParams {
    fn default() -> Self {
        Self {
            num_vantage_points: 10,
            leaf_size: 1,
            max_depth: 64,
            seed: None,
        }
    }
}

impl MVPTreeParams {
    #[must_use]
    pub fn with_num_vantage_points(mut self, num_vantage_points: usize) -> Self {
        self.num_vantage_points = num_vantage_points;
        self
    }

    #[must_use]
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("num_vantage_points", self.num_vantage_points),
            ("leaf_size", self.leaf_size),
            ("max_depth", self.max_depth),
        ] {
            if value == 0 {
                return Err(IndexError::InvalidParameter(format!(
                    "{name} must be at least 1"
                )));
            }
        }
        Ok(())
    }
}

/// MVP-tree index over a borrowed collection.
pub struct MVPTreeIndex<'a, O, D> {
    pub(crate) data: &'a [O],
    pub(crate) distance: D,
    params: MVPTreeParams,
    pub(crate) counter: DistanceCounter,
    pub(crate) tree: VoronoiTree,
    built: bool,
}

impl<'a, O, D: Distance<O>> MVPTreeIndex<'a, O, D> {
    /// Create an unbuilt index over `data`.
    pub fn new(data: &'a [O], distance: D, params: MVPTreeParams) -> Result<Self> {
        params.validate()?;
        index::check_collection_size(data.len())?;
        Ok(Self {
            data,
            distance,
            params,
            counter: DistanceCounter::new(),
            tree: VoronoiTree::default(),
            built: false,
        })
    }

    pub fn params(&self) -> &MVPTreeParams {
        &self.params
    }
}

impl<O, D: Distance<O>> PriorityTree<O> for MVPTreeIndex<'_, O, D> {
    fn root_node(&self) -> Option<u32> {
        self.tree.root
    }

    #[inline]
    fn query_distance(&self, query: Query<'_, O>, id: u32) -> f64 {
        self.counter.increment();
        index::query_distance(&self.distance, self.data, query, id)
    }

    fn expand(&self, node: u32, frontier: &mut Frontier, qdist: &mut dyn FnMut(u32) -> f64) {
        self.expand_node(node, frontier, qdist);
    }
}

impl<O, D: Distance<O>> MetricIndex<O> for MVPTreeIndex<'_, O, D> {
    type Metric = D;

    fn build(&mut self) -> Result<()> {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let seed = self.params.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    fn is_built(&self) -> bool {
        self.built
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn metric(&self) -> &D {
        &self.distance
    }

    fn knn(&self, query: &O, k: usize) -> Result<Vec<(u32, f64)>> {
        let query = Query::Object(query);
        check_query(self.built, self.data.len(), &query)?;
        Ok(self.knn_with(k, |id| self.query_distance(query, id)))
    }

    fn knn_by_id(&self, id: u32, k: usize) -> Result<Vec<(u32, f64)>> {
        let query = Query::Id(id);
        check_query(self.built, self.data.len(), &query)?;
        Ok(self.knn_with(k, |p| self.query_distance(query, p)))
    }

    fn range(&self, query: &O, radius: f64) -> Result<Vec<(u32, f64)>> {
        let query = Query::Object(query);
        check_query(self.built, self.data.len(), &query)?;
        Ok(self.range_with(radius, |id| self.query_distance(query, id)))
    }

    fn range_by_id(&self, id: u32, radius: f64) -> Result<Vec<(u32, f64)>> {
        let query = Query::Id(id);
        check_query(self.built, self.data.len(), &query)?;
        Ok(self.range_with(radius, |p| self.query_distance(query, p)))
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            num_objects: self.data.len(),
            num_nodes: self.tree.nodes.len(),
            height: self.tree.height,
            distance_computations: self.counter.get(),
            algorithm: "MVP-tree",
        }
    }

    fn distance_computations(&self) -> u64 {
        self.counter.get()
    }

    fn reset_counter(&self) {
        self.counter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;

    #[test]
    fn params_reject_zero() {
        let data: Vec<[f64; 2]> = Vec::new();
        for bad in [
            MVPTreeParams::default().with_num_vantage_points(0),
            MVPTreeParams::default().with_leaf_size(0),
            MVPTreeParams::default().with_max_depth(0),
        ] {
            assert!(matches!(
                MVPTreeIndex::new(&data, Euclidean, bad),
                Err(IndexError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn params_round_trip_through_json() {
        let params = MVPTreeParams::default().with_num_vantage_points(4).with_seed(9);
        let json = serde_json::to_string(&params).unwrap();
        let back: MVPTreeParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn stats_report_algorithm() {
        let data: Vec<[f64; 1]> = (0..50).map(|i| [f64::from(i)]).collect();
        let mut index = MVPTreeIndex::new(&data, Euclidean, MVPTreeParams::default()).unwrap();
        index.build().unwrap();
        let stats = index.stats();
        assert_eq!(stats.algorithm, "MVP-tree");
        assert_eq!(stats.num_objects, 50);
        assert!(stats.num_nodes >= 1);
        assert!(stats.distance_computations > 0);
    }
}
