//! Resumable best-first (priority) search shared by all trees.
//!
//! The searcher keeps a min-heap (the [`Frontier`]) of pending work keyed by
//! a lower bound on the query distance:
//!
//! - **node** entries: a subtree not yet expanded, keyed by the tightest
//!   bound the parent's distance table allows;
//! - **candidate** entries: an object keyed by a cheap bound (e.g. from a
//!   distance precomputed at build time), refined on demand;
//! - **result** entries: an object whose exact distance is known.
//!
//! Every pushed key is raised to at least the key of the entry being
//! processed, so keys popped from the heap never decrease. A result entry at
//! the front of the heap is therefore closer than anything still pending, and
//! results come out in non-decreasing distance order.
//!
//! ```text
//! not started ──new/search──▶ positioned ──advance──▶ positioned ... ──▶ exhausted
//!                                  │                                       ▲
//!                                  └────────── decrease_cutoff ────────────┘
//! ```
//!
//! `advance()` does a bounded amount of work and returns; there is no
//! background activity, so abandoning a search is simply not calling it
//! again.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::marker::PhantomData;

use tracing::trace;

use crate::error::{IndexError, Result};
use crate::index::Query;

/// Tree-specific half of priority search.
pub trait PriorityTree<O> {
    /// Root node, or `None` for an empty (or unbuilt) tree.
    fn root_node(&self) -> Option<u32>;

    /// Distance from indexed object `id` to the query. Counts as one
    /// distance computation.
    fn query_distance(&self, query: Query<'_, O>, id: u32) -> f64;

    /// Push the contents of `node` into the frontier: its own objects as
    /// candidates or results, its children as node entries.
    fn expand(&self, node: u32, frontier: &mut Frontier, qdist: &mut dyn FnMut(u32) -> f64);
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Pending {
    Result { id: u32, distance: f64 },
    Candidate(u32),
    Node(u32),
}

impl Pending {
    /// Equal keys: results surface before work that could only tie them.
    fn rank(&self) -> u8 {
        match self {
            Pending::Result { .. } => 0,
            Pending::Candidate(_) => 1,
            Pending::Node(_) => 2,
        }
    }

    fn id(&self) -> u32 {
        match *self {
            Pending::Result { id, .. } | Pending::Candidate(id) | Pending::Node(id) => id,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Entry {
    key: f64,
    pending: Pending,
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smaller key = higher priority
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.pending.rank().cmp(&self.pending.rank()))
            .then_with(|| other.pending.id().cmp(&self.pending.id()))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending work of a priority search.
pub struct Frontier {
    heap: BinaryHeap<Entry>,
    threshold: f64,
    floor: f64,
}

impl Frontier {
    fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            threshold: f64::INFINITY,
            floor: 0.0,
        }
    }

    /// Current cutoff: nothing farther is ever reported.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Queue a subtree whose members are all at least `lower_bound` away.
    pub fn push_node(&mut self, node: u32, lower_bound: f64) {
        self.push(lower_bound, Pending::Node(node));
    }

    /// Queue an object known to be at least `lower_bound` away; its exact
    /// distance is computed when it reaches the front.
    pub fn push_candidate(&mut self, id: u32, lower_bound: f64) {
        self.push(lower_bound, Pending::Candidate(id));
    }

    /// Queue an object at a known exact distance.
    pub fn push_result(&mut self, id: u32, distance: f64) {
        self.push(distance, Pending::Result { id, distance });
    }

    fn push(&mut self, key: f64, pending: Pending) {
        let key = key.max(self.floor);
        if key <= self.threshold {
            self.heap.push(Entry { key, pending });
        }
    }

    /// Next entry within the cutoff. Drops everything once the cheapest
    /// entry lies beyond it.
    fn pop(&mut self) -> Option<Entry> {
        let entry = self.heap.pop()?;
        if entry.key > self.threshold {
            self.heap.clear();
            return None;
        }
        self.floor = entry.key;
        Some(entry)
    }

    fn peek_key(&self) -> Option<f64> {
        self.heap.peek().map(|e| e.key)
    }

    fn reset(&mut self) {
        self.heap.clear();
        self.threshold = f64::INFINITY;
        self.floor = 0.0;
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
struct Current {
    id: u32,
    lower_bound: f64,
    distance: f64,
}

/// Lazily resumable nearest-first iteration over a built tree.
///
/// Borrows the tree immutably, so any number of searchers may run at once,
/// from any number of threads. Also an [`Iterator`] over `(id, distance)`.
pub struct PrioritySearcher<'a, O, T: ?Sized> {
    tree: &'a T,
    query: Query<'a, O>,
    frontier: Frontier,
    current: Option<Current>,
    _marker: PhantomData<fn(&O)>,
}

impl<'a, O, T: PriorityTree<O> + ?Sized> PrioritySearcher<'a, O, T> {
    /// Start a search; positioned on the nearest object (if any).
    pub(crate) fn new(tree: &'a T, query: Query<'a, O>) -> Self {
        let mut searcher = Self {
            tree,
            query,
            frontier: Frontier::new(),
            current: None,
            _marker: PhantomData,
        };
        searcher.restart(query);
        searcher
    }

    /// Restart with a new query object, resetting the cutoff.
    pub fn search(&mut self, query: &'a O) -> &mut Self {
        self.restart(Query::Object(query));
        self
    }

    fn restart(&mut self, query: Query<'a, O>) {
        self.query = query;
        self.frontier.reset();
        self.current = None;
        if let Some(root) = self.tree.root_node() {
            self.frontier.push_node(root, 0.0);
        }
        self.advance();
    }

    /// Move to the next object in distance order.
    pub fn advance(&mut self) -> &mut Self {
        self.current = None;
        let tree = self.tree;
        let query = self.query;
        let mut qdist = |id: u32| tree.query_distance(query, id);

        while let Some(entry) = self.frontier.pop() {
            match entry.pending {
                Pending::Node(node) => tree.expand(node, &mut self.frontier, &mut qdist),
                Pending::Candidate(id) => {
                    let d = qdist(id);
                    self.frontier.push_result(id, d);
                }
                Pending::Result { id, distance } => {
                    self.current = Some(Current {
                        id,
                        lower_bound: entry.key,
                        distance,
                    });
                    break;
                }
            }
        }
        if self.current.is_none() {
            trace!(threshold = self.frontier.threshold, "priority search exhausted");
        }
        self
    }

    /// Whether the searcher is positioned on an object.
    pub fn valid(&self) -> bool {
        self.current.is_some()
    }

    /// Identifier of the current object.
    pub fn id(&self) -> Option<u32> {
        self.current.map(|c| c.id)
    }

    /// Lower bound of the current position (`+∞` once exhausted).
    ///
    /// Non-decreasing over successive `advance()` calls.
    pub fn lower_bound(&self) -> f64 {
        self.current.map_or(f64::INFINITY, |c| c.lower_bound)
    }

    /// Lower bound on the distance of every object not yet reached.
    pub fn all_lower_bound(&self) -> f64 {
        self.frontier.peek_key().unwrap_or(f64::INFINITY)
    }

    /// Exact distance of the current object to the query.
    ///
    /// Objects are refined before they become current, so this never costs
    /// another distance computation.
    pub fn compute_exact_distance(&self) -> Option<f64> {
        self.current.map(|c| c.distance)
    }

    /// Current cutoff.
    pub fn threshold(&self) -> f64 {
        self.frontier.threshold
    }

    /// Narrow the search: nothing beyond `threshold` is reported any more.
    ///
    /// The cutoff may only decrease; a larger (or NaN) value is rejected and
    /// leaves the searcher unchanged. Pending work beyond the new cutoff is
    /// dropped, which may exhaust the search.
    pub fn decrease_cutoff(&mut self, threshold: f64) -> Result<&mut Self> {
        let current = self.frontier.threshold;
        // written negated so NaN is rejected too
        if !(threshold <= current) {
            return Err(IndexError::CutoffIncreased {
                current,
                requested: threshold,
            });
        }
        self.frontier.threshold = threshold;
        if self.frontier.peek_key().is_some_and(|k| k > threshold) {
            self.frontier.heap.clear();
        }
        Ok(self)
    }
}

impl<O, T: PriorityTree<O> + ?Sized> Iterator for PrioritySearcher<'_, O, T> {
    type Item = (u32, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.advance();
        Some((current.id, current.distance))
    }
}
