use crate::error::VecError;

/// Match is a single result from a nearest-neighbor search.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Identifier of the matched vector.
    pub id: String,

    /// Squared Euclidean distance between the query and the matched vector.
    /// Lower values indicate higher similarity; never negative.
    pub distance: f64,
}

/// VecIndex is the interface for exact nearest-neighbor search over dense
/// float32 vectors of one fixed dimension.
///
/// All implementations must be safe for concurrent use (Send + Sync).
/// Searches may run in parallel; an insert excludes every other operation
/// until it has returned.
pub trait VecIndex: Send + Sync {
    /// Append a vector under the given ID.
    ///
    /// IDs are not checked for uniqueness; callers guarantee it.
    fn insert(&self, id: &str, vector: &[f32]) -> Result<(), VecError>;

    /// Return up to `top_k` nearest vectors to the query, ordered by ascending
    /// distance. Equal distances keep insertion order.
    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Match>, VecError>;

    /// Return the number of vectors in the index.
    fn len(&self) -> usize;

    /// Return true if the index contains no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the fixed vector dimension.
    fn dim(&self) -> usize;
}
