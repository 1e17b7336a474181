//! GNAT construction.

use rand::Rng;
use tracing::{debug, warn};

use crate::distance::Distance;
use crate::error::Result;
use crate::gnat::GNATIndex;
use crate::voronoi::{self, VoronoiConfig};

impl<O, D: Distance<O>> GNATIndex<'_, O, D> {
    /// Build the tree drawing randomness from `rng`, ignoring the configured
    /// seed. Does nothing on an already built index.
    pub fn build_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        if self.built {
            return Ok(());
        }
        if !self.distance.is_metric() {
            warn!(
                distance = self.distance.name(),
                "building GNAT with a non-metric distance; pruning may drop true neighbors"
            );
        }

        let config = VoronoiConfig {
            root_pivots: self.params.num_vantage_points,
            leaf_size: self.params.leaf_size,
            max_depth: self.params.max_depth,
            pivots_in_cells: true,
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
            "GNAT built"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::distance::Manhattan;
    use crate::gnat::{GNATIndex, GNATParams};
    use crate::MetricIndex;

    fn grid() -> Vec<[f64; 2]> {
        (0..100).map(|i| [f64::from(i % 10), f64::from(i / 10)]).collect()
    }

    #[test]
    fn pivots_are_tracked_in_their_cells() {
        let data = grid();
        let mut index = GNATIndex::new(&data, Manhattan, GNATParams::default().with_seed(8)).unwrap();
        index.build().unwrap();
        for node in index.tree.nodes.iter().filter(|n| !n.is_leaf()) {
            for i in 0..node.pivots.len() {
                assert_eq!(node.bounds.lower(i, i), 0.0);
            }
        }
    }

    #[test]
    fn build_counts_distances_once() {
        let data = grid();
        let mut index = GNATIndex::new(&data, Manhattan, GNATParams::default().with_seed(8)).unwrap();
        index.build().unwrap();
        let after_build = index.distance_computations();
        assert!(after_build > 0);
        index.build().unwrap();
        assert_eq!(index.distance_computations(), after_build);
        index.reset_counter();
        assert_eq!(index.distance_computations(), 0);
    }
}
