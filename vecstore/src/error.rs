use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VecError {
    #[error("vecstore: dimension mismatch: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("vecstore: non-finite value at component {index}")]
    NonFinite { index: usize },

    #[error("vecstore: invalid dimension 0")]
    ZeroDimension,

    #[error("vecstore: {0}")]
    Io(#[from] std::io::Error),

    #[error("vecstore: invalid format: {0}")]
    InvalidFormat(String),

    #[error("vecstore: torn index: {present} exists but {missing} does not")]
    TornIndex { present: PathBuf, missing: PathBuf },

    #[error("vecstore: row count mismatch: {vectors} vectors, {ids} ids")]
    RowCountMismatch { vectors: usize, ids: usize },
}
