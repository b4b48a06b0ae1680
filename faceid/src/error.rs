use facegate_vecstore::VecError;
use thiserror::Error;

/// Errors returned by faceid operations.
///
/// Business rejections (fraud, mismatch, no face) are not errors; they are
/// [`crate::Decision::Rejected`] values.
#[derive(Debug, Error)]
pub enum FaceIdError {
    #[error("faceid: dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("faceid: embedding component {index} is not finite")]
    NonFiniteEmbedding { index: usize },

    #[error("faceid: invalid config: {0}")]
    InvalidConfig(String),

    #[error("faceid: index: {0}")]
    Index(VecError),

    #[error("faceid: registry: {0}")]
    Registry(String),
}

impl From<VecError> for FaceIdError {
    fn from(e: VecError) -> Self {
        match e {
            VecError::DimensionMismatch { got, want } => Self::DimensionMismatch {
                expected: want,
                got,
            },
            VecError::NonFinite { index } => Self::NonFiniteEmbedding { index },
            other => Self::Index(other),
        }
    }
}
