//! Passive, single-frame liveness scoring.
//!
//! # Architecture
//!
//! A [`Frame`] (8-bit RGB) is scored by four independent heuristics, each
//! mapped into `[0, 1]` by a linear clamp and combined with fixed weights:
//!
//! ```text
//! texture    0.30  Laplacian variance, anchors [0, 5000]
//! color      0.25  hue/saturation histogram entropy, / log2(bins)
//! frequency  0.25  high-frequency share of the 2-D DFT, anchors [0.1, 0.5]
//! sharpness  0.20  Laplacian variance, anchors [0, 500]
//! ```
//!
//! The scorer is pure: the same pixels always give the same score, bit for
//! bit. Weights and anchors are heuristic and uncalibrated; they live in
//! [`LivenessConfig`] so deployments can tune them without code changes.
//!
//! # Usage
//!
//! ```no_run
//! use facegate_liveness::{check_liveness, Frame};
//!
//! let bytes = std::fs::read("capture.jpg").unwrap();
//! let frame = Frame::decode(&bytes, 2048).unwrap();
//! let live = check_liveness(Some(&frame), 0.5);
//! ```

mod color;
mod error;
mod filter;
mod frame;
mod scorer;
mod spectrum;

pub use color::{hsv_planes, shannon_entropy};
pub use error::LivenessError;
pub use filter::{laplacian, variance};
pub use frame::{Frame, DEFAULT_MAX_IMAGE_SIZE};
pub use scorer::{
    calculate_liveness_score, check_liveness, detect_spoofing, Anchor, LivenessConfig,
    LivenessReport, LivenessScorer, Weights,
};
pub use spectrum::high_frequency_ratio;
