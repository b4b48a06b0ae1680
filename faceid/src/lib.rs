//! Face identity decisions over an embedding index.
//!
//! Given an embedding from an external face extractor and, optionally, the
//! identity the requester claims, [`Engine`] decides whether to enroll,
//! verify, identify or reject. Its central guarantee: **one face is never
//! bound to two identities.** A face that matches an enrolled identity other
//! than the claimed one is a [`Rejection::FraudAlert`], and that check runs
//! under the same lock as the enrollment write.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use facegate_faceid::{Acceptance, Config, Decision, Engine, MemoryRegistry, Rejection};
//! use facegate_vecstore::FlatIndex;
//!
//! let engine = Engine::new(
//!     Config::with_dim(4),
//!     Arc::new(FlatIndex::new(4).unwrap()),
//!     Arc::new(MemoryRegistry::new()),
//! )
//! .unwrap();
//!
//! let face = [0.1, 0.2, 0.3, 0.4];
//! let d = engine.authenticate(Some(&face), Some("alice"), None).unwrap();
//! assert_eq!(d.accepted().unwrap().kind, Acceptance::NewEnrollment);
//!
//! let d = engine.authenticate(Some(&face), Some("bob"), None).unwrap();
//! assert!(matches!(d, Decision::Rejected(Rejection::FraudAlert { .. })));
//! ```
//!
//! # Design
//!
//! [`decide`] is the whole decision table as a pure function; [`Engine`]
//! only gathers its inputs (registry lookup, top-1 search) and commits
//! new enrollments. Liveness is an input score, computed elsewhere.

mod config;
mod decision;
mod engine;
mod error;
mod registry;

pub use config::Config;
pub use decision::{
    confidence, decide, Acceptance, Accepted, Decision, DecisionInput, Rejection,
};
pub use engine::Engine;
pub use error::FaceIdError;
pub use registry::{IdentityRegistry, MemoryRegistry};
