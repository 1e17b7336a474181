//! GNAT search.
//!
//! Vantage point `i` is part of cell `i`'s bounds, so once cell `i` is
//! pruned its vantage point cannot qualify either and its query distance is
//! never computed. Uncomputed distances are NaN in the per-node scratch.

use smallvec::{smallvec, SmallVec};

use crate::distance::Distance;
use crate::gnat::GNATIndex;
use crate::heap::KnnHeap;
use crate::priority::Frontier;
use crate::voronoi::VoronoiNode;

type Flags = SmallVec<[bool; 16]>;
type Dists = SmallVec<[f64; 16]>;

/// Query distances to the vantage points of `n` whose cells survive,
/// pruning cells as evidence accumulates.
///
/// `visit(id, d)` is told about every computed distance and returns the
/// search radius to prune with from then on, so a kNN radius that shrinks
/// while scanning prunes as early as possible.
fn scan_pivots(
    n: &VoronoiNode,
    qdist: &mut dyn FnMut(u32) -> f64,
    mut visit: impl FnMut(u32, f64) -> f64,
) -> (Dists, Flags) {
    let m = n.pivots.len();
    let mut dists: Dists = smallvec![f64::NAN; m];
    let mut active: Flags = smallvec![true; m];
    if n.is_leaf() {
        for (i, &p) in n.pivots.iter().enumerate() {
            dists[i] = qdist(p);
            visit(p, dists[i]);
        }
        return (dists, active);
    }
    for i in 0..m {
        if !active[i] {
            continue;
        }
        let x = qdist(n.pivots[i]);
        dists[i] = x;
        let r = visit(n.pivots[i], x);
        for j in 0..m {
            if active[j] && !n.bounds.admits(i, j, x, r) {
                active[j] = false;
            }
        }
    }
    (dists, active)
}

impl<O, D: Distance<O>> GNATIndex<'_, O, D> {
    pub(crate) fn knn_with<F: FnMut(u32) -> f64>(&self, k: usize, mut qdist: F) -> Vec<(u32, f64)> {
        let k = k.min(self.data.len());
        if k == 0 {
            return Vec::new();
        }
        let mut heap = KnnHeap::new(k);
        if let Some(root) = self.tree.root {
            self.knn_node(root, &mut heap, &mut qdist);
        }
        heap.into_sorted_vec()
    }

    fn knn_node(&self, node: u32, heap: &mut KnnHeap, qdist: &mut dyn FnMut(u32) -> f64) {
        let n = &self.tree.nodes[node as usize];
        let (dists, active) = scan_pivots(n, qdist, |id, d| heap.insert(id, d));
        if n.is_leaf() {
            return;
        }

        let mut order: SmallVec<[usize; 16]> = (0..n.children.len())
            .filter(|&j| active[j] && n.children[j].is_some())
            .collect();
        order.sort_unstable_by(|&a, &b| dists[a].total_cmp(&dists[b]));
        for j in order {
            if let Some(child) = n.children[j] {
                if n.cell_admits(j, &dists, heap.tau()) {
                    self.knn_node(child, heap, qdist);
                }
            }
        }
    }

    pub(crate) fn range_with<F: FnMut(u32) -> f64>(&self, radius: f64, mut qdist: F) -> Vec<(u32, f64)> {
        let mut out = Vec::new();
        if !(radius >= 0.0) {
            return out;
        }
        let mut stack: Vec<u32> = self.tree.root.into_iter().collect();
        while let Some(node) = stack.pop() {
            let n = &self.tree.nodes[node as usize];
            let (_, active) = scan_pivots(
                n,
                &mut qdist,
                |id, d| {
                    if d <= radius {
                        out.push((id, d));
                    }
                    radius
                },
            );
            for (j, child) in n.children.iter().enumerate() {
                if let Some(child) = *child {
                    if active[j] {
                        stack.push(child);
                    }
                }
            }
        }
        out
    }

    pub(crate) fn expand_node(
        &self,
        node: u32,
        frontier: &mut Frontier,
        qdist: &mut dyn FnMut(u32) -> f64,
    ) {
        let n = &self.tree.nodes[node as usize];
        let (dists, active) = scan_pivots(n, qdist, |id, d| {
            frontier.push_result(id, d);
            frontier.threshold()
        });
        for (j, child) in n.children.iter().enumerate() {
            if let Some(child) = *child {
                if active[j] {
                    frontier.push_node(child, n.bounds.cell_min_dist(j, &dists));
                }
            }
        }
    }
}
