use thiserror::Error;

/// Errors returned by liveness operations.
#[derive(Debug, Error)]
pub enum LivenessError {
    #[error("liveness: pixel buffer is {got} bytes, want {want} for {width}x{height} RGB")]
    BufferSize {
        width: usize,
        height: usize,
        got: usize,
        want: usize,
    },

    #[error("liveness: decode image: {0}")]
    Decode(#[from] image::ImageError),
}
