//! vantage: exact nearest neighbor search in metric spaces.
//!
//! Tree indexes that only ever look at objects through a distance function,
//! so they work for anything with a metric: vectors, byte strings, edit
//! distances, graphs. Organized by tree family:
//!
//! - `vptree/`: Vantage point tree (one vantage point, median split)
//! - `mvptree/`: Multi-vantage-point tree (`m` vantage points, Voronoi cells)
//! - `gnat/`: Geometric near-neighbor access tree (`m` split points, range tables)
//!
//! Every index implements [`MetricIndex`], offering exact kNN, range, and
//! resumable priority (nearest-first) search, by object or by identifier.
//!
//! # Critical Nuances
//!
//! ## Exactness needs a metric
//!
//! Pruning relies on the triangle inequality. With a distance that violates
//! it (squared Euclidean, cosine) results may silently miss true neighbors.
//! Such distances report `is_metric() == false`; trees still build (with a
//! warning), but [`MetricIndex::knn_searcher`] and friends return `None` so
//! callers know to fall back to a linear scan.
//!
//! ## Intrinsic dimensionality
//!
//! All three trees degrade toward a linear scan as the intrinsic
//! dimensionality of the data grows: distances concentrate, the shells and
//! cells recorded at build time overlap, and fewer subtrees can be skipped.
//! [`MetricIndex::distance_computations`] shows how much pruning a workload
//! actually gets.
//!
//! ## Identifiers
//!
//! Indexes borrow the collection they are built over and never copy it.
//! Results are `(id, distance)` pairs where `id` is the `u32` position of
//! the object in that collection.
//!
//! # Example
//!
//! ```rust
//! use vantage::distance::Euclidean;
//! use vantage::mvptree::{MVPTreeIndex, MVPTreeParams};
//! use vantage::MetricIndex;
//!
//! # fn main() -> Result<(), vantage::IndexError> {
//! let points: Vec<Vec<f64>> = (0..100).map(|i| vec![f64::from(i), 0.0]).collect();
//! let mut index = MVPTreeIndex::new(&points, Euclidean, MVPTreeParams::default())?;
//! index.build()?;
//!
//! let query = vec![42.2, 0.0];
//! let mut search = index.priority_search(&query)?;
//! assert_eq!(search.id(), Some(42));
//! search.advance();
//! assert_eq!(search.id(), Some(43));
//! # Ok(())
//! # }
//! ```

pub mod bounds;
pub mod distance;
pub mod error;
pub mod heap;
pub mod index;
pub mod pivot;
pub mod priority;
pub mod searcher;
pub mod stats;

#[cfg(any(feature = "mvptree", feature = "gnat"))]
mod voronoi;

#[cfg(feature = "gnat")]
pub mod gnat;
#[cfg(feature = "mvptree")]
pub mod mvptree;
#[cfg(feature = "vptree")]
pub mod vptree;

// Re-exports
pub use distance::{Chebyshev, Cosine, Distance, Euclidean, Hamming, Manhattan, Minkowski, SquaredEuclidean};
pub use error::{IndexError, Result};
pub use index::{MetricIndex, Query};
pub use priority::PrioritySearcher;
pub use stats::IndexStats;

#[cfg(feature = "gnat")]
pub use gnat::{GNATIndex, GNATParams};
#[cfg(feature = "mvptree")]
pub use mvptree::{MVPTreeIndex, MVPTreeParams};
#[cfg(feature = "vptree")]
pub use vptree::{VPTreeIndex, VPTreeParams};
