//! VP-tree construction.

use rand::Rng;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::bounds::Bounds;
use crate::distance::Distance;
use crate::error::Result;
use crate::pivot::select_by_spread;
use crate::vptree::{VPNode, VPTreeIndex};

impl<O, D: Distance<O>> VPTreeIndex<'_, O, D> {
    /// Build the tree drawing randomness from `rng`.
    ///
    /// Same as [`MetricIndex::build`](crate::MetricIndex::build) but ignores
    /// the configured seed. Does nothing on an already built index.
    pub fn build_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        if self.built {
            return Ok(());
        }
        if !self.distance.is_metric() {
            warn!(
                distance = self.distance.name(),
                "building VP-tree with a non-metric distance; pruning may drop true neighbors"
            );
        }

        let ids: Vec<u32> = (0..self.data.len() as u32).collect();
        self.nodes.clear();
        self.height = 0;
        if !ids.is_empty() {
            self.root = Some(self.build_node(ids, Bounds::UNBOUNDED, 1, rng));
        }
        self.built = true;

        debug!(
            objects = self.data.len(),
            nodes = self.nodes.len(),
            height = self.height,
            distance_computations = self.counter.get(),
            "VP-tree built"
        );
        Ok(())
    }

    /// Build the subtree over `ids` (non-empty) and return its node index.
    fn build_node<R: Rng + ?Sized>(
        &mut self,
        mut ids: Vec<u32>,
        bounds: Bounds,
        depth: usize,
        rng: &mut R,
    ) -> u32 {
        self.height = self.height.max(depth);

        let pick = select_by_spread(
            ids.len(),
            self.params.sample_size,
            |a, b| self.pair_distance(ids[a], ids[b]),
            rng,
        );
        let vp = ids.swap_remove(pick);

        let mut ties = SmallVec::new();
        let mut rest = Vec::with_capacity(ids.len());
        for id in ids {
            let d = self.pair_distance(id, vp);
            if d <= 0.0 {
                ties.push(id);
            } else {
                rest.push((id, d));
            }
        }

        let node = self.nodes.len() as u32;
        self.nodes.push(VPNode {
            vp,
            ties,
            tail: Vec::new(),
            left: None,
            right: None,
            bounds,
        });

        if rest.len() <= self.params.leaf_size {
            rest.sort_unstable_by(|a, b| a.1.total_cmp(&b.1));
            self.nodes[node as usize].tail = rest;
            return node;
        }

        // Median split; values equal to the median go right, so the right
        // side is never empty.
        let mid = rest.len() / 2;
        rest.select_nth_unstable_by(mid, |a, b| a.1.total_cmp(&b.1));
        let median = rest[mid].1;
        let (inner, outer): (Vec<(u32, f64)>, Vec<(u32, f64)>) =
            rest.into_iter().partition(|&(_, d)| d < median);

        if !inner.is_empty() {
            let child_bounds = Bounds::of(inner.iter().map(|&(_, d)| d));
            let ids = inner.into_iter().map(|(id, _)| id).collect();
            let left = self.build_node(ids, child_bounds, depth + 1, rng);
            self.nodes[node as usize].left = Some(left);
        }
        let child_bounds = Bounds::of(outer.iter().map(|&(_, d)| d));
        let ids = outer.into_iter().map(|(id, _)| id).collect();
        let right = self.build_node(ids, child_bounds, depth + 1, rng);
        self.nodes[node as usize].right = Some(right);

        node
    }
}
