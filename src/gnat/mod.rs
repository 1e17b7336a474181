//! Geometric Near-neighbor Access Tree (GNAT).
//!
//! Like the MVP-tree, each node partitions its objects into the Voronoi
//! cells of `m` well-separated split points and records, for every (split
//! point, cell) pair, the range of distances between them. GNAT additionally
//! counts each split point as a member of its own cell.
//!
//! **Technical Name**: Geometric Near-neighbor Access Tree
//!
//! # Algorithm
//!
//! - **Split points**: greedy farthest-point selection over a sample of
//!   `3m` objects
//! - **Range tables**: `m × m` min/max distances, split point `i` to cell `j`;
//!   split point `i` itself is tracked in cell `i`
//! - **Search**: split points are examined one at a time; each computed
//!   distance prunes every cell whose range it rules out, and the split
//!   point of a pruned cell is never measured
//! - **Children**: built over non-empty cells only, with
//!   `clamp(m * |cell| / n, 2, 200)` split points
//!
//! # Usage
//!
//! ```rust
//! use vantage::distance::Hamming;
//! use vantage::gnat::{GNATIndex, GNATParams};
//! use vantage::MetricIndex;
//!
//! # fn main() -> Result<(), vantage::IndexError> {
//! let codes: Vec<[u8; 2]> = vec![[0x00, 0x00], [0x01, 0x00], [0xff, 0xff], [0x0f, 0x00]];
//! let mut index = GNATIndex::new(&codes, Hamming, GNATParams::default())?;
//! index.build()?;
//!
//! let close = index.range_by_id(0, 1.0)?;
//! assert_eq!(close.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! - Brin (1995): "Near Neighbor Search in Large Metric Spaces"

mod construction;
mod search;

use serde::{Deserialize, Serialize};

use crate::distance::Distance;
use crate::error::{IndexError, Result};
use crate::index::{self, check_query, MetricIndex, Query};
use crate::priority::{Frontier, PriorityTree};
use crate::stats::{DistanceCounter, IndexStats};
use crate::voronoi::VoronoiTree;

/// GNAT parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GNATParams {
    /// Split points of the root node.
    pub num_vantage_points: usize,

    /// Subsets of at most this many objects become leaves.
    pub leaf_size: usize,

    /// Nodes at this depth become leaves regardless of size.
    pub max_depth: usize,

    /// Seed for vantage point sampling; drawn from entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for GNATParams {
    fn default() -> Self {
        Self {
            num_vantage_points: 10,
            leaf_size: 1,
            max_depth: 64,
            seed: None,
        }
    }
}

impl GNATParams {
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

/// GNAT index over a borrowed collection.
pub struct GNATIndex<'a, O, D> {
    pub(crate) data: &'a [O],
    pub(crate) distance: D,
    params: GNATParams,
    pub(crate) counter: DistanceCounter,
    pub(crate) tree: VoronoiTree,
    built: bool,
}

impl<'a, O, D: Distance<O>> GNATIndex<'a, O, D> {
    /// Create an unbuilt index over `data`.
    pub fn new(data: &'a [O], distance: D, params: GNATParams) -> Result<Self> {
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

    pub fn params(&self) -> &GNATParams {
        &self.params
    }
}

impl<O, D: Distance<O>> PriorityTree<O> for GNATIndex<'_, O, D> {
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

impl<O, D: Distance<O>> MetricIndex<O> for GNATIndex<'_, O, D> {
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
            algorithm: "GNAT",
        }
    }

    fn distance_computations(&self) -> u64 {
        self.counter.get()
    }

    fn reset_counter(&self) {
        self.counter.reset();
    }
}
