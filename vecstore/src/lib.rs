//! Exact nearest-neighbor index over fixed-dimension f32 embeddings.
//!
//! [`FlatIndex`] keeps entries in insertion order and answers k-nearest
//! queries by brute-force squared Euclidean distance. [`DiskIndex`] wraps it
//! with write-through persistence: every insert rewrites both on-disk
//! artifacts before returning.
//!
//! # On-disk layout
//!
//! ```text
//! faces.idx       vector blob, row i = i-th inserted embedding
//! faces.idx.meta  JSON array of ids, element i names row i
//! ```

mod disk;
mod error;
mod flat;
pub mod flat_io;
mod l2;
mod vecstore;

pub use disk::{meta_path, DiskIndex};
pub use error::VecError;
pub use flat::FlatIndex;
pub use l2::l2_squared;
pub use vecstore::{Match, VecIndex};
