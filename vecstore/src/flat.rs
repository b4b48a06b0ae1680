use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::VecError;
use crate::l2::l2_squared;
use crate::vecstore::{Match, VecIndex};

/// Rows of a flat index. `ids[i]` names `data[i * dim..(i + 1) * dim]`.
pub(crate) struct FlatInner {
    pub(crate) dim: usize,
    pub(crate) ids: Vec<String>,
    pub(crate) data: Vec<f32>,
}

impl FlatInner {
    pub(crate) fn rows(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub(crate) fn check_dim(&self, got: usize) -> Result<(), VecError> {
        if got != self.dim {
            return Err(VecError::DimensionMismatch {
                got,
                want: self.dim,
            });
        }
        Ok(())
    }

    /// Checks the dimension and that every component is finite; a NaN
    /// distance would otherwise sort as a perfect match.
    pub(crate) fn check_vector(&self, vector: &[f32]) -> Result<(), VecError> {
        self.check_dim(vector.len())?;
        match vector.iter().position(|x| !x.is_finite()) {
            Some(index) => Err(VecError::NonFinite { index }),
            None => Ok(()),
        }
    }

    pub(crate) fn push(&mut self, id: &str, vector: &[f32]) {
        self.ids.push(id.to_string());
        self.data.extend_from_slice(vector);
    }

    /// Undo the most recent [`FlatInner::push`].
    pub(crate) fn pop(&mut self) {
        if self.ids.pop().is_some() {
            let keep = self.ids.len() * self.dim;
            self.data.truncate(keep);
        }
    }
}

/// FlatIndex is an exact, append-only [`VecIndex`] using brute-force squared
/// Euclidean distance. Search is O(n·dim).
///
/// All methods are safe for concurrent use (via RwLock).
pub struct FlatIndex {
    inner: RwLock<FlatInner>,
}

impl FlatIndex {
    /// Creates an empty index of the given dimension.
    pub fn new(dim: usize) -> Result<Self, VecError> {
        Self::from_parts(dim, Vec::new(), Vec::new())
    }

    /// Rebuilds an index from row-major vector data and the co-indexed ids.
    pub fn from_parts(dim: usize, ids: Vec<String>, data: Vec<f32>) -> Result<Self, VecError> {
        if dim == 0 {
            return Err(VecError::ZeroDimension);
        }
        if data.len() % dim != 0 {
            return Err(VecError::InvalidFormat(format!(
                "{} floats is not a whole number of {dim}-dimensional rows",
                data.len()
            )));
        }
        if let Some(pos) = data.iter().position(|x| !x.is_finite()) {
            return Err(VecError::InvalidFormat(format!(
                "non-finite value in row {}",
                pos / dim
            )));
        }
        let vectors = data.len() / dim;
        if vectors != ids.len() {
            return Err(VecError::RowCountMismatch {
                vectors,
                ids: ids.len(),
            });
        }
        Ok(Self {
            inner: RwLock::new(FlatInner { dim, ids, data }),
        })
    }

    /// Returns a copy of the ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.inner.read().ids.clone()
    }

    pub(crate) fn read_inner(&self) -> RwLockReadGuard<'_, FlatInner> {
        self.inner.read()
    }

    pub(crate) fn write_inner(&self) -> RwLockWriteGuard<'_, FlatInner> {
        self.inner.write()
    }
}

impl VecIndex for FlatIndex {
    fn insert(&self, id: &str, vector: &[f32]) -> Result<(), VecError> {
        let mut inner = self.inner.write();
        inner.check_vector(vector)?;
        inner.push(id, vector);
        Ok(())
    }

    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Match>, VecError> {
        let inner = self.inner.read();
        inner.check_vector(query)?;
        Ok(search_rows(&inner, query, top_k))
    }

    fn len(&self) -> usize {
        self.inner.read().rows()
    }

    fn dim(&self) -> usize {
        self.inner.read().dim
    }
}

pub(crate) fn search_rows(inner: &FlatInner, query: &[f32], top_k: usize) -> Vec<Match> {
    if inner.rows() == 0 || top_k == 0 {
        return vec![];
    }

    let mut scored: Vec<(usize, f64)> = (0..inner.rows())
        .map(|i| (i, l2_squared(query, inner.row(i))))
        .collect();

    // sort_by is stable: equal distances stay in row (insertion) order.
    scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    scored.truncate(top_k);

    scored
        .into_iter()
        .map(|(i, distance)| Match {
            id: inner.ids[i].clone(),
            distance,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_search() {
        let idx = FlatIndex::new(4).unwrap();
        idx.insert("a", &[1.0, 0.0, 0.0, 0.0]).unwrap();
        idx.insert("b", &[0.0, 1.0, 0.0, 0.0]).unwrap();
        idx.insert("c", &[0.9, 0.1, 0.0, 0.0]).unwrap();

        let matches = idx.search(&[1.0, 0.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a");
        assert_eq!(matches[0].distance, 0.0);
        assert_eq!(matches[1].id, "c");
    }

    #[test]
    fn test_search_empty() {
        let idx = FlatIndex::new(3).unwrap();
        assert!(idx.search(&[1.0, 0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_search_top_k_zero() {
        let idx = FlatIndex::new(2).unwrap();
        idx.insert("a", &[1.0, 0.0]).unwrap();
        assert!(idx.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_fewer_than_k() {
        let idx = FlatIndex::new(2).unwrap();
        idx.insert("a", &[1.0, 0.0]).unwrap();
        idx.insert("b", &[0.0, 1.0]).unwrap();
        let matches = idx.search(&[0.0, 0.0], 10).unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let idx = FlatIndex::new(2).unwrap();
        idx.insert("first", &[1.0, 0.0]).unwrap();
        idx.insert("second", &[0.0, 1.0]).unwrap();
        idx.insert("third", &[-1.0, 0.0]).unwrap();

        // All three are at distance 1 from the origin.
        let matches = idx.search(&[0.0, 0.0], 3).unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_sorted_ascending() {
        let idx = FlatIndex::new(1).unwrap();
        for (i, v) in [5.0f32, 1.0, 3.0, 2.0, 4.0].iter().enumerate() {
            idx.insert(&format!("r{i}"), &[*v]).unwrap();
        }
        let matches = idx.search(&[0.0], 5).unwrap();
        assert!(matches.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(matches[0].id, "r1");
    }

    #[test]
    fn test_insert_dimension_mismatch() {
        let idx = FlatIndex::new(3).unwrap();
        let err = idx.insert("a", &[1.0, 0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, VecError::DimensionMismatch { got: 4, want: 3 }));
        assert_eq!(idx.len(), 0);
    }

    #[test]
    fn test_search_dimension_mismatch() {
        let idx = FlatIndex::new(3).unwrap();
        assert!(idx.search(&[1.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let idx = FlatIndex::new(2).unwrap();
        idx.insert("a", &[1.0, 0.0]).unwrap();

        let err = idx.insert("nan", &[f32::NAN, 0.0]).unwrap_err();
        assert!(matches!(err, VecError::NonFinite { index: 0 }));
        let err = idx.insert("inf", &[0.0, f32::INFINITY]).unwrap_err();
        assert!(matches!(err, VecError::NonFinite { index: 1 }));
        assert_eq!(idx.len(), 1);

        assert!(matches!(
            idx.search(&[f32::NAN, f32::NAN], 1),
            Err(VecError::NonFinite { index: 0 })
        ));
        assert!(idx.search(&[0.0, f32::NEG_INFINITY], 1).is_err());
    }

    #[test]
    fn test_from_parts_non_finite() {
        let err = FlatIndex::from_parts(
            2,
            vec!["a".into(), "b".into()],
            vec![1.0, 0.0, 0.0, f32::NAN],
        );
        assert!(matches!(err, Err(VecError::InvalidFormat(_))));
    }

    #[test]
    fn test_zero_dimension() {
        assert!(matches!(FlatIndex::new(0), Err(VecError::ZeroDimension)));
    }

    #[test]
    fn test_from_parts_row_count_mismatch() {
        let err = FlatIndex::from_parts(2, vec!["a".into()], vec![1.0, 0.0, 0.0, 1.0]);
        assert!(matches!(
            err,
            Err(VecError::RowCountMismatch { vectors: 2, ids: 1 })
        ));
    }

    #[test]
    fn test_from_parts_partial_row() {
        assert!(FlatIndex::from_parts(2, vec!["a".into()], vec![1.0, 0.0, 0.5]).is_err());
    }

    #[test]
    fn test_pop_restores_previous_state() {
        let idx = FlatIndex::new(2).unwrap();
        idx.insert("a", &[1.0, 2.0]).unwrap();
        {
            let mut inner = idx.write_inner();
            inner.push("b", &[3.0, 4.0]);
            inner.pop();
        }
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.read_inner().data, vec![1.0, 2.0]);
    }

    #[test]
    fn test_search_is_idempotent() {
        let idx = FlatIndex::new(2).unwrap();
        idx.insert("a", &[0.3, 0.7]).unwrap();
        idx.insert("b", &[0.6, 0.1]).unwrap();
        let q = [0.5, 0.5];
        assert_eq!(idx.search(&q, 2).unwrap(), idx.search(&q, 2).unwrap());
    }
}
