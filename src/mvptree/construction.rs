//! MVP-tree construction.

use rand::Rng;
use tracing::{debug, warn};

use crate::distance::Distance;
use crate::error::Result;
use crate::mvptree::MVPTreeIndex;
use crate::voronoi::{self, VoronoiConfig};

impl<O, D: Distance<O>> MVPTreeIndex<'_, O, D> {
    /// Build the tree drawing randomness from `rng`, ignoring the configured
    /// seed. Does nothing on an already built index.
    pub fn build_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        if self.built {
            return Ok(());
        }
        if !self.distance.is_metric() {
            warn!(
                distance = self.distance.name(),
                "building MVP-tree with a non-metric distance; pruning may drop true neighbors"
            );
        }

        let config = VoronoiConfig {
            root_pivots: self.params.num_vantage_points,
            leaf_size: self.params.leaf_size,
            max_depth: self.params.max_depth,
            pivots_in_cells: false,
        };
        let (data, distance, counter) = (self.data, &self.distance, &self.counter);
        let tree = voronoi::build(
            data.len(),
            config,
            |a, b| {
                counter.increment();
                distance.distance(&data[a as usize], &data[b as usize])
            },
            rng,
        );
        self.tree = tree;
        self.built = true;

        debug!(
            objects = self.data.len(),
            nodes = self.tree.nodes.len(),
            height = self.tree.height,
            distance_computations = self.counter.get(),
            "MVP-tree built"
        );
        Ok(())
    }
}
