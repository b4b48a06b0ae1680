use std::fmt;

use facegate_vecstore::Match;
use serde::Serialize;

use crate::config::Config;

/// Converts a squared L2 distance into a similarity in `[0, 1]`.
/// A NaN distance has no similarity at all.
pub fn confidence(distance: f64) -> f64 {
    if distance.is_nan() {
        return 0.0;
    }
    1.0 / (1.0 + distance.max(0.0))
}

/// Outcome of a single request. Every request ends in exactly one of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accepted(Accepted),
    Rejected(Rejection),
}

impl Decision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Returns the acceptance, if any.
    pub fn accepted(&self) -> Option<&Accepted> {
        match self {
            Self::Accepted(a) => Some(a),
            Self::Rejected(_) => None,
        }
    }

    /// Returns the rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(r) => Some(r),
        }
    }
}

/// Why a request was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Acceptance {
    /// The face is new and the claimed identity was free; it is now enrolled.
    NewEnrollment,
    /// The face matches the claimed identity's enrolled face.
    Verified,
    /// No identity was claimed; the face matches an enrolled identity.
    Identified,
}

impl fmt::Display for Acceptance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewEnrollment => write!(f, "new_enrollment"),
            Self::Verified => write!(f, "verified"),
            Self::Identified => write!(f, "identified"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accepted {
    pub kind: Acceptance,

    /// The enrolled, verified or identified identity.
    pub identity: String,

    /// `1 / (1 + distance)` to the matched face. `None` for a new enrollment,
    /// which by definition matched nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Whether the request's frame passed the liveness threshold. False when
    /// no liveness score was supplied.
    pub liveness_passed: bool,
}

/// Why a request was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// The extractor found no face in the image.
    NoFaceDetected,

    /// The registry knows the claimed identity but the index holds no faces.
    DataInconsistency { identity: String },

    /// The claimed identity is enrolled with a different face.
    FaceMismatch { identity: String, confidence: f64 },

    /// The face is already enrolled under another identity. Only that
    /// identity's id is disclosed.
    FraudAlert { matched_identity: String },

    /// No identity was claimed and no enrolled face is close enough.
    NoMatch,

    /// Explicit enrollment of an identity that is already enrolled.
    AlreadyEnrolled { identity: String },

    /// The request would have been accepted, but liveness is required and
    /// the frame did not pass.
    LivenessFailed {
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<f64>,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFaceDetected => write!(
                f,
                "no face detected in the image; upload a clear photo showing your face"
            ),
            Self::DataInconsistency { identity } => write!(
                f,
                "identity {identity:?} is registered but no enrolled faces exist"
            ),
            Self::FaceMismatch { identity, .. } => write!(
                f,
                "identity {identity:?} is enrolled with a different face"
            ),
            Self::FraudAlert { matched_identity } => write!(
                f,
                "fraud alert: this face is already registered to {matched_identity:?}"
            ),
            Self::NoMatch => write!(f, "no matching face found"),
            Self::AlreadyEnrolled { identity } => {
                write!(f, "identity {identity:?} is already enrolled")
            }
            Self::LivenessFailed { .. } => write!(f, "liveness check failed"),
        }
    }
}

/// Everything the decision table looks at for one request.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    /// False when the extractor returned no embedding.
    pub face_detected: bool,
    pub claimed: Option<&'a str>,
    /// Whether `claimed` is in the identity registry. Ignored without a claim.
    pub claimed_registered: bool,
    /// Top-1 search result, `None` when the index is empty.
    pub nearest: Option<&'a Match>,
    pub liveness_score: Option<f64>,
}

/// Applies the decision table. Pure: no I/O, no index access.
///
/// Rules, first match wins:
///
/// 1. no face -> `NoFaceDetected`
/// 2. empty index -> new enrollment, or `DataInconsistency` if the claimed
///    identity is already registered
/// 3. confidence below threshold -> `FaceMismatch` if the claimed identity is
///    registered, else new enrollment
/// 4. confidence at or above threshold -> `Verified` when the match is the
///    claimed identity, `FraudAlert` otherwise
/// 5. accepted outcomes carry `liveness_passed`; with `require_liveness` a
///    failed check turns them into `LivenessFailed`
///
/// Without a claimed identity the request is an identification: a match at or
/// above threshold is `Identified`, anything else is `NoMatch`.
pub fn decide(cfg: &Config, input: &DecisionInput<'_>) -> Decision {
    if !input.face_detected {
        return Decision::Rejected(Rejection::NoFaceDetected);
    }

    let verdict = match input.claimed {
        Some(claimed) => decide_claim(cfg, claimed, input),
        None => decide_identify(cfg, input),
    };

    match verdict {
        Verdict::Reject(r) => Decision::Rejected(r),
        Verdict::Accept {
            kind,
            identity,
            confidence,
        } => {
            let liveness_passed = input
                .liveness_score
                .is_some_and(|s| s >= cfg.liveness_threshold);
            if cfg.require_liveness && !liveness_passed {
                return Decision::Rejected(Rejection::LivenessFailed {
                    score: input.liveness_score,
                });
            }
            Decision::Accepted(Accepted {
                kind,
                identity,
                confidence,
                liveness_passed,
            })
        }
    }
}

enum Verdict {
    Accept {
        kind: Acceptance,
        identity: String,
        confidence: Option<f64>,
    },
    Reject(Rejection),
}

fn decide_claim(cfg: &Config, claimed: &str, input: &DecisionInput<'_>) -> Verdict {
    let new_enrollment = || Verdict::Accept {
        kind: Acceptance::NewEnrollment,
        identity: claimed.to_string(),
        confidence: None,
    };

    let Some(nearest) = input.nearest else {
        if input.claimed_registered {
            return Verdict::Reject(Rejection::DataInconsistency {
                identity: claimed.to_string(),
            });
        }
        return new_enrollment();
    };

    let c = confidence(nearest.distance);
    if c < cfg.similarity_threshold {
        if input.claimed_registered {
            return Verdict::Reject(Rejection::FaceMismatch {
                identity: claimed.to_string(),
                confidence: c,
            });
        }
        return new_enrollment();
    }

    if nearest.id == claimed {
        Verdict::Accept {
            kind: Acceptance::Verified,
            identity: claimed.to_string(),
            confidence: Some(c),
        }
    } else {
        Verdict::Reject(Rejection::FraudAlert {
            matched_identity: nearest.id.clone(),
        })
    }
}

fn decide_identify(cfg: &Config, input: &DecisionInput<'_>) -> Verdict {
    match input.nearest {
        Some(m) if confidence(m.distance) >= cfg.similarity_threshold => Verdict::Accept {
            kind: Acceptance::Identified,
            identity: m.id.clone(),
            confidence: Some(confidence(m.distance)),
        },
        _ => Verdict::Reject(Rejection::NoMatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(id: &str, distance: f64) -> Match {
        Match {
            id: id.into(),
            distance,
        }
    }

    fn input<'a>(
        claimed: Option<&'a str>,
        registered: bool,
        nearest: Option<&'a Match>,
    ) -> DecisionInput<'a> {
        DecisionInput {
            face_detected: true,
            claimed,
            claimed_registered: registered,
            nearest,
            liveness_score: Some(0.9),
        }
    }

    /// Distance whose confidence is exactly `c`.
    fn distance_for(c: f64) -> f64 {
        1.0 / c - 1.0
    }

    #[test]
    fn confidence_curve() {
        assert_eq!(confidence(0.0), 1.0);
        assert_eq!(confidence(1.0), 0.5);
        assert!((confidence(distance_for(0.4)) - 0.4).abs() < 1e-12);
        assert_eq!(confidence(-1.0), 1.0);
        assert_eq!(confidence(f64::NAN), 0.0);
        assert_eq!(confidence(f64::INFINITY), 0.0);
    }

    #[test]
    fn rule1_no_face_wins_over_everything() {
        let near = m("alice", 0.0);
        let mut inp = input(Some("alice"), true, Some(&near));
        inp.face_detected = false;
        assert_eq!(
            decide(&Config::default(), &inp),
            Decision::Rejected(Rejection::NoFaceDetected)
        );
    }

    #[test]
    fn rule2_empty_index_enrolls() {
        let d = decide(&Config::default(), &input(Some("alice"), false, None));
        let a = d.accepted().unwrap();
        assert_eq!(a.kind, Acceptance::NewEnrollment);
        assert_eq!(a.identity, "alice");
        assert_eq!(a.confidence, None);
        assert!(a.liveness_passed);
    }

    #[test]
    fn rule2_empty_index_but_registered_is_inconsistent() {
        let d = decide(&Config::default(), &input(Some("alice"), true, None));
        assert_eq!(
            d,
            Decision::Rejected(Rejection::DataInconsistency {
                identity: "alice".into()
            })
        );
    }

    #[test]
    fn rule3_far_face_registered_claim_is_mismatch() {
        let near = m("alice", distance_for(0.4));
        let d = decide(&Config::default(), &input(Some("alice"), true, Some(&near)));
        match d {
            Decision::Rejected(Rejection::FaceMismatch {
                identity,
                confidence,
            }) => {
                assert_eq!(identity, "alice");
                assert!((confidence - 0.4).abs() < 1e-9);
            }
            other => panic!("expected FaceMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rule3_far_face_new_claim_enrolls() {
        let near = m("alice", 5.0);
        let d = decide(&Config::default(), &input(Some("bob"), false, Some(&near)));
        assert_eq!(d.accepted().unwrap().kind, Acceptance::NewEnrollment);
        assert_eq!(d.accepted().unwrap().identity, "bob");
    }

    #[test]
    fn rule4_same_identity_verifies() {
        let near = m("alice", 0.0);
        let d = decide(&Config::default(), &input(Some("alice"), true, Some(&near)));
        let a = d.accepted().unwrap();
        assert_eq!(a.kind, Acceptance::Verified);
        assert_eq!(a.confidence, Some(1.0));
    }

    #[test]
    fn rule4_threshold_is_inclusive() {
        // confidence(2/3) rounds to within one ulp above 0.6.
        let near = m("alice", 2.0 / 3.0);
        assert!(confidence(near.distance) >= 0.6);
        let d = decide(&Config::default(), &input(Some("alice"), true, Some(&near)));
        assert_eq!(d.accepted().unwrap().kind, Acceptance::Verified);
    }

    #[test]
    fn rule4_other_identity_is_fraud() {
        let near = m("alice", 0.0);
        for registered in [false, true] {
            let d = decide(&Config::default(), &input(Some("bob"), registered, Some(&near)));
            assert_eq!(
                d,
                Decision::Rejected(Rejection::FraudAlert {
                    matched_identity: "alice".into()
                })
            );
        }
    }

    #[test]
    fn rule5_liveness_reported_not_blocking() {
        let mut inp = input(Some("alice"), false, None);
        inp.liveness_score = Some(0.1);
        let d = decide(&Config::default(), &inp);
        assert!(!d.accepted().unwrap().liveness_passed);

        inp.liveness_score = None;
        let d = decide(&Config::default(), &inp);
        assert!(!d.accepted().unwrap().liveness_passed);
    }

    #[test]
    fn rule5_liveness_required_blocks_acceptance() {
        let cfg = Config {
            require_liveness: true,
            ..Config::default()
        };
        let mut inp = input(Some("alice"), false, None);
        inp.liveness_score = Some(0.2);
        assert_eq!(
            decide(&cfg, &inp),
            Decision::Rejected(Rejection::LivenessFailed { score: Some(0.2) })
        );

        inp.liveness_score = Some(0.5);
        assert!(decide(&cfg, &inp).is_accepted());
    }

    #[test]
    fn rule5_fraud_regardless_of_liveness() {
        let cfg = Config {
            require_liveness: true,
            ..Config::default()
        };
        let near = m("alice", 0.0);
        let mut inp = input(Some("bob"), false, Some(&near));
        inp.liveness_score = Some(0.0);
        assert!(matches!(
            decide(&cfg, &inp),
            Decision::Rejected(Rejection::FraudAlert { .. })
        ));
    }

    #[test]
    fn identify_without_claim() {
        let cfg = Config::default();
        let near = m("alice", 0.1);
        let d = decide(&cfg, &input(None, false, Some(&near)));
        let a = d.accepted().unwrap();
        assert_eq!(a.kind, Acceptance::Identified);
        assert_eq!(a.identity, "alice");

        let far = m("alice", 10.0);
        assert_eq!(
            decide(&cfg, &input(None, false, Some(&far))),
            Decision::Rejected(Rejection::NoMatch)
        );
        assert_eq!(
            decide(&cfg, &input(None, false, None)),
            Decision::Rejected(Rejection::NoMatch)
        );
    }

    #[test]
    fn fraud_message_names_only_the_identity() {
        let r = Rejection::FraudAlert {
            matched_identity: "alice".into(),
        };
        assert_eq!(
            r.to_string(),
            "fraud alert: this face is already registered to \"alice\""
        );
    }

    #[test]
    fn decision_serializes_with_reason_tag() {
        let d = Decision::Rejected(Rejection::FraudAlert {
            matched_identity: "alice".into(),
        });
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["rejected"]["reason"], "fraud_alert");
        assert_eq!(v["rejected"]["matched_identity"], "alice");

        let d = Decision::Accepted(Accepted {
            kind: Acceptance::NewEnrollment,
            identity: "bob".into(),
            confidence: None,
            liveness_passed: false,
        });
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["accepted"]["kind"], "new_enrollment");
        assert!(v["accepted"].get("confidence").is_none());
    }
}
