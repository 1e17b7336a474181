//! Vantage point tree (VP-tree).
//!
//! Binary metric tree: each node picks one vantage point and splits the
//! remaining objects at the median of their distances to it.
//!
//! **Technical Name**: Vantage Point Tree
//!
//! # Algorithm
//!
//! - **Vantage point**: chosen among a random sample as the candidate whose
//!   distances to a second sample have the largest second moment around
//!   their median (points near the "edge" of the data spread best)
//! - **Ties**: duplicates of the vantage point (distance 0) stay in the node
//!   and cost no distance computation at query time
//! - **Split**: `d < median` goes left, `d >= median` goes right, so exact
//!   ties with the median never stall the recursion
//! - **Bounds**: every child records the min/max distance from its parent's
//!   vantage point to its members; a search skips the child when
//!   `[x - τ, x + τ]` misses that shell
//! - **Leaves**: once at most `leaf_size` objects remain they are stored
//!   with their precomputed distance to the vantage point, which already
//!   bounds their query distance by `|x - d|`
//!
//! Adversarial duplication (many objects at the median distance) can
//! unbalance the tree; that trade-off is accepted.
//!
//! # Usage
//!
//! ```rust
//! use vantage::distance::Euclidean;
//! use vantage::vptree::{VPTreeIndex, VPTreeParams};
//! use vantage::MetricIndex;
//!
//! # fn main() -> Result<(), vantage::IndexError> {
//! let points = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [5.0, 5.0]];
//! let mut index = VPTreeIndex::new(&points, Euclidean, VPTreeParams::default().with_seed(42))?;
//! index.build()?;
//!
//! let nearest = index.knn(&[0.1, 0.0], 2)?;
//! assert_eq!(nearest[0].0, 0);
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! - Yianilos (1993): "Data Structures and Algorithms for Nearest Neighbor
//!   Search in General Metric Spaces"

mod construction;
mod search;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::bounds::Bounds;
use crate::distance::Distance;
use crate::error::{IndexError, Result};
use crate::index::{self, check_query, MetricIndex, Query};
use crate::priority::{Frontier, PriorityTree};
use crate::stats::{DistanceCounter, IndexStats};

/// VP-tree parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VPTreeParams {
    /// Candidates sampled per vantage point choice (1 = uniform random pick).
    pub sample_size: usize,

    /// Largest number of non-tied objects stored in a leaf.
    pub leaf_size: usize,

    /// Seed for vantage point sampling; drawn from entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for VPTreeParams {
    fn default() -> Self {
        Self {
            sample_size: 10,
            leaf_size: 1,
            seed: None,
        }
    }
}

impl VPTreeParams {
    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    #[must_use]
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            return Err(IndexError::InvalidParameter(
                "sample_size must be at least 1".to_string(),
            ));
        }
        if self.leaf_size == 0 {
            return Err(IndexError::InvalidParameter(
                "leaf_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// VP-tree node.
#[derive(Debug, Clone)]
pub(crate) struct VPNode {
    pub(crate) vp: u32,
    /// Objects at distance 0 from the vantage point.
    pub(crate) ties: SmallVec<[u32; 2]>,
    /// Leaf payload: `(id, distance to vp)`, ascending by distance.
    pub(crate) tail: Vec<(u32, f64)>,
    pub(crate) left: Option<u32>,
    pub(crate) right: Option<u32>,
    /// Min/max distance from the parent's vantage point to this subtree.
    pub(crate) bounds: Bounds,
}

/// VP-tree index over a borrowed collection.
pub struct VPTreeIndex<'a, O, D> {
    pub(crate) data: &'a [O],
    pub(crate) distance: D,
    params: VPTreeParams,
    pub(crate) counter: DistanceCounter,
    pub(crate) nodes: Vec<VPNode>,
    pub(crate) root: Option<u32>,
    pub(crate) height: usize,
    built: bool,
}

impl<'a, O, D: Distance<O>> VPTreeIndex<'a, O, D> {
    /// Create an unbuilt index over `data`.
    pub fn new(data: &'a [O], distance: D, params: VPTreeParams) -> Result<Self> {
        params.validate()?;
        index::check_collection_size(data.len())?;
        Ok(Self {
            data,
            distance,
            params,
            counter: DistanceCounter::new(),
            nodes: Vec::new(),
            root: None,
            height: 0,
            built: false,
        })
    }

    pub fn params(&self) -> &VPTreeParams {
        &self.params
    }

    #[inline]
    pub(crate) fn pair_distance(&self, a: u32, b: u32) -> f64 {
        self.counter.increment();
        self.distance
            .distance(&self.data[a as usize], &self.data[b as usize])
    }
}

impl<O, D: Distance<O>> PriorityTree<O> for VPTreeIndex<'_, O, D> {
    fn root_node(&self) -> Option<u32> {
        self.root
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

impl<O, D: Distance<O>> MetricIndex<O> for VPTreeIndex<'_, O, D> {
    type Metric = D;

    fn build(&mut self) -> Result<()> {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        // Use an explicit seed when configured; otherwise derive one from entropy.
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
            num_nodes: self.nodes.len(),
            height: self.height,
            distance_computations: self.counter.get(),
            algorithm: "VP-tree",
        }
    }

    fn distance_computations(&self) -> u64 {
        self.counter.get()
    }

    fn reset_counter(&self) {
        self.counter.reset();
    }
}
