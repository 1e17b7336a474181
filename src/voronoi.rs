//! Multi-pivot Voronoi partitioning shared by the MVP-tree and GNAT.
//!
//! Each internal node holds `m` well-separated vantage points and splits the
//! remaining objects into `m` cells, assigning every object to its nearest
//! vantage point (first one on ties). For every pair (vantage point `i`,
//! cell `j`) the node records the min/max distance in a [`BoundTable`]; that
//! table is all the search side needs to prune.
//!
//! The two trees differ in one detail: GNAT counts vantage point `i` as a
//! member of cell `i` (so a pruned cell also prunes its vantage point),
//! while the MVP-tree keeps vantage points out of the bounds and always
//! examines them.
//!
//! Children get fewer vantage points the smaller their cell is:
//! `clamp(m_root * |cell| / n, 2, 200)`, never more than the cell holds.

use rand::Rng;
use smallvec::SmallVec;

use crate::bounds::BoundTable;
use crate::pivot::select_farthest;

/// Vantage points per node never exceed this.
pub(crate) const MAX_PIVOTS: usize = 200;

/// One node of a multi-pivot tree.
///
/// A leaf has no children and an empty table; its objects are all stored
/// as `pivots`.
#[derive(Debug, Clone)]
pub(crate) struct VoronoiNode {
    pub(crate) pivots: SmallVec<[u32; 8]>,
    /// Child per cell; `None` where the cell is empty.
    pub(crate) children: SmallVec<[Option<u32>; 8]>,
    pub(crate) bounds: BoundTable,
}

impl VoronoiNode {
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether cell `j` may hold an object within `radius` of the query.
    ///
    /// `dists[i]` is the query distance to vantage point `i`, or NaN when it
    /// was never computed (no evidence from that vantage point).
    pub(crate) fn cell_admits(&self, j: usize, dists: &[f64], radius: f64) -> bool {
        dists
            .iter()
            .enumerate()
            .all(|(i, &x)| x.is_nan() || self.bounds.admits(i, j, x, radius))
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct VoronoiConfig {
    pub(crate) root_pivots: usize,
    pub(crate) leaf_size: usize,
    pub(crate) max_depth: usize,
    /// Whether vantage point `i` is tracked in the bounds of cell `i`.
    pub(crate) pivots_in_cells: bool,
}

/// Flattened multi-pivot tree.
#[derive(Debug, Clone, Default)]
pub(crate) struct VoronoiTree {
    pub(crate) nodes: Vec<VoronoiNode>,
    pub(crate) root: Option<u32>,
    pub(crate) height: usize,
}

/// Build a tree over objects `0..n`. `dist(a, b)` measures two objects.
pub(crate) fn build<R, F>(n: usize, config: VoronoiConfig, dist: F, rng: &mut R) -> VoronoiTree
where
    R: Rng + ?Sized,
    F: FnMut(u32, u32) -> f64,
{
    let mut builder = Builder {
        config,
        total: n,
        dist,
        rng,
        nodes: Vec::new(),
        height: 0,
    };
    let root = (n > 0).then(|| {
        let m = config.root_pivots.min(MAX_PIVOTS);
        builder.node((0..n as u32).collect(), m, 1)
    });
    VoronoiTree {
        nodes: builder.nodes,
        root,
        height: builder.height,
    }
}

struct Builder<'r, F, R: ?Sized> {
    config: VoronoiConfig,
    total: usize,
    dist: F,
    rng: &'r mut R,
    nodes: Vec<VoronoiNode>,
    height: usize,
}

impl<F, R> Builder<'_, F, R>
where
    R: Rng + ?Sized,
    F: FnMut(u32, u32) -> f64,
{
    fn node(&mut self, ids: Vec<u32>, m: usize, depth: usize) -> u32 {
        self.height = self.height.max(depth);
        let index = self.nodes.len() as u32;

        if ids.len() <= self.config.leaf_size || depth >= self.config.max_depth {
            self.nodes.push(VoronoiNode {
                pivots: ids.into_iter().collect(),
                children: SmallVec::new(),
                bounds: BoundTable::new(0),
            });
            return index;
        }

        let picks = select_farthest(ids.len(), m, |a, b| (self.dist)(ids[a], ids[b]), &mut *self.rng);
        let m = picks.len();
        let pivots: SmallVec<[u32; 8]> = picks.iter().map(|&p| ids[p]).collect();

        // slot[pos] = Some(i) when ids[pos] is vantage point i
        let mut slot: Vec<Option<usize>> = vec![None; ids.len()];
        for (i, &p) in picks.iter().enumerate() {
            slot[p] = Some(i);
        }

        let mut bounds = BoundTable::new(m);
        let mut cells: Vec<Vec<u32>> = vec![Vec::new(); m];
        let mut dists = vec![0.0; m];

        for (pos, &id) in ids.iter().enumerate() {
            let own = slot[pos];
            if own.is_some() && !self.config.pivots_in_cells {
                continue;
            }
            let mut cell = 0;
            for (i, &p) in pivots.iter().enumerate() {
                dists[i] = if own == Some(i) { 0.0 } else { (self.dist)(p, id) };
                if dists[i] < dists[cell] {
                    cell = i;
                }
            }
            match own {
                Some(i) => cell = i,
                None => cells[cell].push(id),
            }
            for (i, &d) in dists.iter().enumerate() {
                bounds.extend(i, cell, d);
            }
        }

        self.nodes.push(VoronoiNode {
            pivots,
            children: SmallVec::from_elem(None, m),
            bounds,
        });

        for (j, cell) in cells.into_iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let child_m = (self.config.root_pivots * cell.len() / self.total)
                .clamp(2, MAX_PIVOTS)
                .min(cell.len());
            let child = self.node(cell, child_m, depth + 1);
            self.nodes[index as usize].children[j] = Some(child);
        }
        index
    }
}
