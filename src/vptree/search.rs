//! VP-tree search: kNN, range and priority expansion.
//!
//! All traversals take the query distance as a closure so by-object and
//! by-identifier queries share one code path.

use crate::distance::Distance;
use crate::heap::KnnHeap;
use crate::priority::Frontier;
use crate::vptree::VPTreeIndex;

impl<O, D: Distance<O>> VPTreeIndex<'_, O, D> {
    pub(crate) fn knn_with<F: FnMut(u32) -> f64>(&self, k: usize, mut qdist: F) -> Vec<(u32, f64)> {
        let k = k.min(self.data.len());
        if k == 0 {
            return Vec::new();
        }
        let mut heap = KnnHeap::new(k);
        if let Some(root) = self.root {
            self.knn_node(root, &mut heap, &mut qdist);
        }
        heap.into_sorted_vec()
    }

    fn knn_node<F: FnMut(u32) -> f64>(&self, node: u32, heap: &mut KnnHeap, qdist: &mut F) {
        let n = &self.nodes[node as usize];
        let x = qdist(n.vp);
        heap.insert(n.vp, x);
        for &t in &n.ties {
            heap.insert(t, x);
        }

        // Leaf tail is sorted by distance to the vantage point, so once
        // d > x + τ nothing further can qualify.
        for &(id, d) in &n.tail {
            let tau = heap.tau();
            if d - x > tau {
                break;
            }
            if x - d > tau {
                continue;
            }
            heap.insert(id, qdist(id));
        }

        // Closer shell first: the side whose boundary the query falls short of.
        let left_first = match (n.left, n.right) {
            (Some(l), Some(r)) => {
                let boundary = (self.nodes[l as usize].bounds.high + self.nodes[r as usize].bounds.low) / 2.0;
                x < boundary
            }
            _ => true,
        };
        let order = if left_first {
            [n.left, n.right]
        } else {
            [n.right, n.left]
        };
        for child in order.into_iter().flatten() {
            if self.nodes[child as usize].bounds.admits(x, heap.tau()) {
                self.knn_node(child, heap, qdist);
            }
        }
    }

    pub(crate) fn range_with<F: FnMut(u32) -> f64>(&self, radius: f64, mut qdist: F) -> Vec<(u32, f64)> {
        let mut out = Vec::new();
        // NaN fails this comparison too
        if !(radius >= 0.0) {
            return out;
        }
        let mut stack: Vec<u32> = self.root.into_iter().collect();
        while let Some(node) = stack.pop() {
            let n = &self.nodes[node as usize];
            let x = qdist(n.vp);
            if x <= radius {
                out.push((n.vp, x));
                out.extend(n.ties.iter().map(|&t| (t, x)));
            }
            for &(id, d) in &n.tail {
                if d - x > radius {
                    break;
                }
                if x - d > radius {
                    continue;
                }
                let dq = qdist(id);
                if dq <= radius {
                    out.push((id, dq));
                }
            }
            for child in [n.left, n.right].into_iter().flatten() {
                if self.nodes[child as usize].bounds.admits(x, radius) {
                    stack.push(child);
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
        let n = &self.nodes[node as usize];
        let x = qdist(n.vp);
        frontier.push_result(n.vp, x);
        for &t in &n.ties {
            frontier.push_result(t, x);
        }
        for &(id, d) in &n.tail {
            frontier.push_candidate(id, (x - d).abs());
        }
        for child in [n.left, n.right].into_iter().flatten() {
            frontier.push_node(child, self.nodes[child as usize].bounds.min_dist(x));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::distance::{Euclidean, Manhattan};
    use crate::vptree::{VPTreeIndex, VPTreeParams};
    use crate::MetricIndex;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_points(n: usize, seed: u64) -> Vec<[f64; 3]> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                [
                    rng.random_range(-10.0..10.0),
                    rng.random_range(-10.0..10.0),
                    rng.random_range(-10.0..10.0),
                ]
            })
            .collect()
    }

    fn brute_knn(data: &[[f64; 3]], q: &[f64; 3], k: usize) -> Vec<f64> {
        use crate::distance::Distance;
        let mut d: Vec<f64> = data.iter().map(|p| Euclidean.distance(p, q)).collect();
        d.sort_by(f64::total_cmp);
        d.truncate(k);
        d
    }

    #[test]
    fn knn_matches_linear_scan() {
        let data = random_points(500, 1);
        for leaf_size in [1, 8] {
            let params = VPTreeParams::default().with_leaf_size(leaf_size).with_seed(3);
            let mut index = VPTreeIndex::new(&data, Euclidean, params).unwrap();
            index.build().unwrap();

            for q in random_points(20, 2) {
                let got: Vec<f64> = index.knn(&q, 10).unwrap().iter().map(|r| r.1).collect();
                assert_eq!(got, brute_knn(&data, &q, 10));
            }
        }
    }

    #[test]
    fn knn_prunes() {
        let data = random_points(2000, 4);
        let mut index = VPTreeIndex::new(&data, Euclidean, VPTreeParams::default().with_seed(1)).unwrap();
        index.build().unwrap();
        index.reset_counter();
        index.knn(&[0.0, 0.0, 0.0], 1).unwrap();
        assert!(index.distance_computations() < 2000);
    }

    #[test]
    fn range_is_inclusive() {
        let data: Vec<[f64; 1]> = (0..10).map(|i| [f64::from(i)]).collect();
        let mut index = VPTreeIndex::new(&data, Manhattan, VPTreeParams::default()).unwrap();
        index.build().unwrap();
        let mut got: Vec<u32> = index.range(&[4.0], 2.0).unwrap().into_iter().map(|r| r.0).collect();
        got.sort_unstable();
        assert_eq!(got, vec![2, 3, 4, 5, 6]);
        assert!(index.range(&[4.0], -1.0).unwrap().is_empty());
        assert!(index.range(&[4.0], f64::NAN).unwrap().is_empty());
    }

    #[test]
    fn by_id_finds_itself_first() {
        let data = random_points(100, 6);
        let mut index = VPTreeIndex::new(&data, Euclidean, VPTreeParams::default()).unwrap();
        index.build().unwrap();
        let hits = index.knn_by_id(17, 3).unwrap();
        assert_eq!(hits[0], (17, 0.0));
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn priority_search_visits_everything_in_order() {
        let data = random_points(300, 8);
        let mut index = VPTreeIndex::new(&data, Euclidean, VPTreeParams::default().with_leaf_size(5)).unwrap();
        index.build().unwrap();
        let q = [1.0, -2.0, 0.5];
        let found: Vec<(u32, f64)> = index.priority_search(&q).unwrap().collect();
        assert_eq!(found.len(), data.len());
        assert!(found.windows(2).all(|w| w[0].1 <= w[1].1));
    }
}
