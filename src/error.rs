//! Error types for vantage.

use thiserror::Error;

/// Errors that can occur during index construction or search.
///
/// Degenerate inputs (empty collections, `k` larger than the collection,
/// negative radii) are not errors: they produce empty or clamped results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A query was issued before `build()` completed.
    #[error("index not built")]
    NotBuilt,

    /// A by-identifier query referenced an object outside the collection.
    #[error("unknown object id {id} (index holds {len} objects)")]
    UnknownId { id: u32, len: usize },

    /// `decrease_cutoff` was called with a threshold above the current one.
    #[error("cutoff may only decrease: current {current}, requested {requested}")]
    CutoffIncreased { current: f64, requested: f64 },

    /// The collection does not fit into `u32` identifiers.
    #[error("too many objects for u32 identifiers: {0}")]
    TooManyObjects(usize),
}

pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let e = IndexError::UnknownId { id: 7, len: 3 };
        assert_eq!(e.to_string(), "unknown object id 7 (index holds 3 objects)");

        let e = IndexError::CutoffIncreased {
            current: 1.0,
            requested: 2.5,
        };
        assert!(e.to_string().contains("2.5"));
    }
}
