use std::sync::Arc;

use facegate_vecstore::VecIndex;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::decision::{decide, Acceptance, Decision, DecisionInput, Rejection};
use crate::registry::IdentityRegistry;
use crate::FaceIdError;

/// Runs the decision table against a shared embedding index and identity
/// registry, and commits new enrollments.
///
/// Thread-safe: every request that may enroll holds one engine-wide lock
/// from its index search until its insert has been persisted, so two
/// concurrent requests can never bind the same new face to two identities.
/// Identification is read-only and does not take the lock.
pub struct Engine {
    cfg: Config,
    index: Arc<dyn VecIndex>,
    registry: Arc<dyn IdentityRegistry>,
    write_lock: Mutex<()>,
}

impl Engine {
    /// Creates an engine over the given index and registry.
    /// Fails if the config is invalid or its dimension differs from the
    /// index's.
    pub fn new(
        cfg: Config,
        index: Arc<dyn VecIndex>,
        registry: Arc<dyn IdentityRegistry>,
    ) -> Result<Self, FaceIdError> {
        cfg.validate()?;
        if index.dim() != cfg.dim {
            return Err(FaceIdError::DimensionMismatch {
                expected: cfg.dim,
                got: index.dim(),
            });
        }
        Ok(Self {
            cfg,
            index,
            registry,
            write_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of enrolled faces.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Verify-or-enroll a face against a claimed identity.
    ///
    /// `embedding` is `None` when the extractor found no face. Without a
    /// claimed identity this is [`Engine::identify`]. A new enrollment has
    /// been written to the index and recorded in the registry by the time
    /// this returns.
    pub fn authenticate(
        &self,
        embedding: Option<&[f32]>,
        claimed: Option<&str>,
        liveness_score: Option<f64>,
    ) -> Result<Decision, FaceIdError> {
        let Some(claimed) = claimed else {
            return self.identify(embedding, liveness_score);
        };
        let Some(embedding) = embedding else {
            return Ok(Decision::Rejected(Rejection::NoFaceDetected));
        };
        self.check_embedding(embedding)?;

        let _guard = self.write_lock.lock();
        let registered = self.registry.exists(claimed)?;
        self.decide_and_commit(embedding, claimed, registered, liveness_score)
    }

    /// Enroll a face under an identity that must not be enrolled yet.
    ///
    /// Already-enrolled identities are rejected before the face is looked at.
    /// A face that matches the (unregistered) identity itself means the
    /// index and registry disagree and is reported as `DataInconsistency`.
    pub fn enroll(
        &self,
        embedding: Option<&[f32]>,
        identity: &str,
        liveness_score: Option<f64>,
    ) -> Result<Decision, FaceIdError> {
        let _guard = self.write_lock.lock();
        if self.registry.exists(identity)? {
            return Ok(Decision::Rejected(Rejection::AlreadyEnrolled {
                identity: identity.to_string(),
            }));
        }

        let Some(embedding) = embedding else {
            return Ok(Decision::Rejected(Rejection::NoFaceDetected));
        };
        self.check_embedding(embedding)?;

        let decision = self.decide_and_commit(embedding, identity, false, liveness_score)?;
        if matches!(&decision, Decision::Accepted(a) if a.kind == Acceptance::Verified) {
            warn!(identity, "index holds a face for an unregistered identity");
            return Ok(Decision::Rejected(Rejection::DataInconsistency {
                identity: identity.to_string(),
            }));
        }
        Ok(decision)
    }

    /// Finds the enrolled identity whose face matches, without claiming one.
    /// Never writes.
    pub fn identify(
        &self,
        embedding: Option<&[f32]>,
        liveness_score: Option<f64>,
    ) -> Result<Decision, FaceIdError> {
        let Some(embedding) = embedding else {
            return Ok(Decision::Rejected(Rejection::NoFaceDetected));
        };
        self.check_embedding(embedding)?;

        let nearest = self.index.search(embedding, 1)?;
        let decision = decide(
            &self.cfg,
            &DecisionInput {
                face_detected: true,
                claimed: None,
                claimed_registered: false,
                nearest: nearest.first(),
                liveness_score,
            },
        );
        debug!(?decision, "identify");
        Ok(decision)
    }

    /// Must be called with `write_lock` held.
    fn decide_and_commit(
        &self,
        embedding: &[f32],
        claimed: &str,
        registered: bool,
        liveness_score: Option<f64>,
    ) -> Result<Decision, FaceIdError> {
        let nearest = self.index.search(embedding, 1)?;
        let decision = decide(
            &self.cfg,
            &DecisionInput {
                face_detected: true,
                claimed: Some(claimed),
                claimed_registered: registered,
                nearest: nearest.first(),
                liveness_score,
            },
        );

        match &decision {
            Decision::Accepted(a) if a.kind == Acceptance::NewEnrollment => {
                self.commit_enrollment(claimed, embedding)?;
                info!(
                    identity = claimed,
                    liveness_passed = a.liveness_passed,
                    enrolled = self.index.len(),
                    "enrolled new identity"
                );
            }
            Decision::Rejected(Rejection::FraudAlert { matched_identity }) => {
                warn!(
                    claimed,
                    matched = %matched_identity,
                    "fraud alert: face already enrolled under another identity"
                );
            }
            Decision::Rejected(Rejection::DataInconsistency { .. }) => {
                warn!(claimed, "identity registered but index is empty");
            }
            _ => debug!(claimed, ?decision, "decided"),
        }
        Ok(decision)
    }

    /// Records the identity, then writes the face. A failed index write
    /// forgets the identity again, so neither side keeps half an enrollment.
    fn commit_enrollment(&self, claimed: &str, embedding: &[f32]) -> Result<(), FaceIdError> {
        self.registry.record(claimed)?;
        if let Err(e) = self.index.insert(claimed, embedding) {
            if let Err(undo) = self.registry.forget(claimed) {
                error!(
                    identity = claimed,
                    error = %undo,
                    "registry holds an identity whose face was not stored"
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn check_embedding(&self, embedding: &[f32]) -> Result<(), FaceIdError> {
        if embedding.len() != self.cfg.dim {
            return Err(FaceIdError::DimensionMismatch {
                expected: self.cfg.dim,
                got: embedding.len(),
            });
        }
        if let Some(index) = embedding.iter().position(|x| !x.is_finite()) {
            return Err(FaceIdError::NonFiniteEmbedding { index });
        }
        Ok(())
    }
}
