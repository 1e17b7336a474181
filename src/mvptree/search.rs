//! MVP-tree search.

use smallvec::SmallVec;

use crate::distance::Distance;
use crate::heap::KnnHeap;
use crate::mvptree::MVPTreeIndex;
use crate::priority::Frontier;

type Dists = SmallVec<[f64; 16]>;

impl<O, D: Distance<O>> MVPTreeIndex<'_, O, D> {
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

    fn knn_node<F: FnMut(u32) -> f64>(&self, node: u32, heap: &mut KnnHeap, qdist: &mut F) {
        let n = &self.tree.nodes[node as usize];
        let dists: Dists = n
            .pivots
            .iter()
            .map(|&p| {
                let d = qdist(p);
                heap.insert(p, d);
                d
            })
            .collect();
        if n.is_leaf() {
            return;
        }

        // Nearest vantage point's cell first; τ shrinks as cells are visited,
        // so every cell is rechecked against the current τ.
        let mut order: SmallVec<[usize; 16]> = (0..n.children.len())
            .filter(|&j| n.children[j].is_some())
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
            let mut dists = Dists::with_capacity(n.pivots.len());
            for &p in &n.pivots {
                let d = qdist(p);
                if d <= radius {
                    out.push((p, d));
                }
                dists.push(d);
            }
            for (j, child) in n.children.iter().enumerate() {
                if let Some(child) = *child {
                    if n.cell_admits(j, &dists, radius) {
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
        let mut dists = Dists::with_capacity(n.pivots.len());
        for &p in &n.pivots {
            let d = qdist(p);
            frontier.push_result(p, d);
            dists.push(d);
        }
        for (j, child) in n.children.iter().enumerate() {
            if let Some(child) = *child {
                frontier.push_node(child, n.bounds.cell_min_dist(j, &dists));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::distance::{Distance, Euclidean, Hamming};
    use crate::mvptree::{MVPTreeIndex, MVPTreeParams};
    use crate::MetricIndex;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_points(n: usize, seed: u64) -> Vec<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| (0..4).map(|_| rng.random_range(0.0..1.0)).collect())
            .collect()
    }

    #[test]
    fn knn_and_range_match_linear_scan() {
        let data = random_points(400, 21);
        let params = MVPTreeParams::default().with_num_vantage_points(5).with_seed(2);
        let mut index = MVPTreeIndex::new(&data, Euclidean, params).unwrap();
        index.build().unwrap();

        for q in random_points(15, 22) {
            let mut expected: Vec<f64> = data.iter().map(|p| Euclidean.distance(p, &q)).collect();
            expected.sort_by(f64::total_cmp);

            let got: Vec<f64> = index.knn(&q, 7).unwrap().iter().map(|r| r.1).collect();
            assert_eq!(got, expected[..7].to_vec());

            let radius = expected[30];
            let in_range = index.range(&q, radius).unwrap();
            assert_eq!(in_range.len(), expected.iter().filter(|&&d| d <= radius).count());
            assert!(in_range.iter().all(|&(_, d)| d <= radius));
        }
    }

    #[test]
    fn hamming_codes() {
        let mut rng = StdRng::seed_from_u64(5);
        let codes: Vec<[u8; 4]> = (0..256).map(|_| rng.random()).collect();
        let mut index = MVPTreeIndex::new(&codes, Hamming, MVPTreeParams::default()).unwrap();
        index.build().unwrap();

        let hits = index.range_by_id(3, 4.0).unwrap();
        let expected = codes.iter().filter(|c| Hamming.distance(*c, &codes[3]) <= 4.0).count();
        assert_eq!(hits.len(), expected);
        assert!(hits.contains(&(3, 0.0)));
    }

    #[test]
    fn priority_order_is_sorted() {
        let data = random_points(200, 30);
        let mut index = MVPTreeIndex::new(&data, Euclidean, MVPTreeParams::default()).unwrap();
        index.build().unwrap();
        let q = vec![0.5; 4];
        let dists: Vec<f64> = index.priority_search(&q).unwrap().map(|r| r.1).collect();
        assert_eq!(dists.len(), 200);
        assert!(dists.windows(2).all(|w| w[0] <= w[1]));
    }
}
