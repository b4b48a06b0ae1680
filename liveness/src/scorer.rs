use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::color_diversity;
use crate::filter::{laplacian, variance};
use crate::frame::Frame;
use crate::spectrum::high_frequency_ratio;

/// Texture score for frames too small to take a 3x3 Laplacian over.
const NEUTRAL_TEXTURE: f64 = 0.5;

/// Linear-clamp normalization range: `low` maps to 0, `high` maps to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub low: f64,
    pub high: f64,
}

impl Anchor {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Maps `raw` into `[0, 1]`. A degenerate range (`high <= low`) yields 0.
    pub fn normalize(&self, raw: f64) -> f64 {
        let span = self.high - self.low;
        if span <= 0.0 || raw.is_nan() {
            return 0.0;
        }
        ((raw - self.low) / span).clamp(0.0, 1.0)
    }
}

/// Per-signal weights. The defaults sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub texture: f64,
    pub color: f64,
    pub frequency: f64,
    pub sharpness: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            texture: 0.30,
            color: 0.25,
            frequency: 0.25,
            sharpness: 0.20,
        }
    }
}

/// Configuration for [`LivenessScorer`].
///
/// The anchors are uncalibrated heuristics; change them deliberately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    pub weights: Weights,
    /// Laplacian variance range for the texture signal (default: [0, 5000]).
    pub texture: Anchor,
    /// High-frequency energy ratio range (default: [0.1, 0.5]).
    pub frequency: Anchor,
    /// Laplacian variance range for the sharpness signal (default: [0, 500]).
    pub sharpness: Anchor,
    /// Minimum overall score for a frame to count as live (default: 0.5).
    pub threshold: f64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            texture: Anchor::new(0.0, 5000.0),
            frequency: Anchor::new(0.1, 0.5),
            sharpness: Anchor::new(0.0, 500.0),
            threshold: 0.5,
        }
    }
}

/// Sub-scores and overall score for one frame, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LivenessReport {
    pub texture: f64,
    pub color: f64,
    pub frequency: f64,
    pub sharpness: f64,
    pub score: f64,
}

/// Scores frames for passive liveness. Stateless apart from its config.
#[derive(Debug, Clone, Default)]
pub struct LivenessScorer {
    cfg: LivenessConfig,
}

impl LivenessScorer {
    /// Creates a scorer with the default weights, anchors and threshold.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(cfg: LivenessConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &LivenessConfig {
        &self.cfg
    }

    /// Computes all four sub-scores and their weighted sum.
    pub fn report(&self, frame: &Frame) -> LivenessReport {
        let (w, h) = (frame.width(), frame.height());
        let gray = frame.grayscale();
        let lap_var = variance(&laplacian(&gray, w, h));

        let texture = if w < 3 || h < 3 {
            NEUTRAL_TEXTURE
        } else {
            self.cfg.texture.normalize(lap_var)
        };
        let color = color_diversity(frame);
        let frequency = self
            .cfg
            .frequency
            .normalize(high_frequency_ratio(&gray, w, h));
        let sharpness = self.cfg.sharpness.normalize(lap_var);

        let wt = &self.cfg.weights;
        let score = texture * wt.texture
            + color * wt.color
            + frequency * wt.frequency
            + sharpness * wt.sharpness;

        debug!(
            width = w,
            height = h,
            texture,
            color,
            frequency,
            sharpness,
            score,
            "liveness scored"
        );

        LivenessReport {
            texture,
            color,
            frequency,
            sharpness,
            score,
        }
    }

    /// Overall liveness score in `[0, 1]`.
    pub fn score(&self, frame: &Frame) -> f64 {
        self.report(frame).score
    }

    /// True if a frame is present, non-empty, and scores at least the
    /// configured threshold.
    pub fn check(&self, frame: Option<&Frame>) -> bool {
        match frame {
            Some(f) if !f.is_empty() => self.score(f) >= self.cfg.threshold,
            _ => false,
        }
    }

    /// Returns `(is_spoof, spoof_score)` where `spoof_score = 1 - score`
    /// and a frame is a spoof when `spoof_score > 0.5`.
    pub fn detect_spoofing(&self, frame: &Frame) -> (bool, f64) {
        let spoof = 1.0 - self.score(frame);
        (spoof > 0.5, spoof)
    }
}

/// Scores a frame with the default configuration.
pub fn calculate_liveness_score(frame: &Frame) -> f64 {
    LivenessScorer::new().score(frame)
}

/// Returns `calculate_liveness_score(frame) >= threshold`; false when the
/// frame is absent or empty.
pub fn check_liveness(frame: Option<&Frame>, threshold: f64) -> bool {
    LivenessScorer::with_config(LivenessConfig {
        threshold,
        ..LivenessConfig::default()
    })
    .check(frame)
}

/// [`LivenessScorer::detect_spoofing`] with the default configuration.
pub fn detect_spoofing(frame: &Frame) -> (bool, f64) {
    LivenessScorer::new().detect_spoofing(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random RGB noise.
    fn noise_frame(w: usize, h: usize, seed: u64) -> Frame {
        let mut state = seed;
        let rgb = (0..w * h * 3)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                (state >> 56) as u8
            })
            .collect();
        Frame::new(w, h, rgb).unwrap()
    }

    fn solid_frame(w: usize, h: usize, px: [u8; 3]) -> Frame {
        Frame::new(w, h, px.repeat(w * h)).unwrap()
    }

    #[test]
    fn anchor_normalize() {
        let a = Anchor::new(0.1, 0.5);
        assert_eq!(a.normalize(0.0), 0.0);
        assert_eq!(a.normalize(0.1), 0.0);
        assert!((a.normalize(0.3) - 0.5).abs() < 1e-12);
        assert_eq!(a.normalize(0.9), 1.0);
        assert_eq!(Anchor::new(1.0, 1.0).normalize(5.0), 0.0);
        assert_eq!(a.normalize(f64::NAN), 0.0);
    }

    #[test]
    fn default_weights_sum_to_one() {
        let w = Weights::default();
        assert!((w.texture + w.color + w.frequency + w.sharpness - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flat_frame_scores_low() {
        let r = LivenessScorer::new().report(&solid_frame(32, 32, [120, 90, 60]));
        assert_eq!(r.texture, 0.0);
        assert_eq!(r.sharpness, 0.0);
        assert_eq!(r.frequency, 0.0);
        assert_eq!(r.color, 0.0);
        assert_eq!(r.score, 0.0);
        assert!(!check_liveness(Some(&solid_frame(32, 32, [120, 90, 60])), 0.5));
    }

    #[test]
    fn noisy_frame_scores_high() {
        let frame = noise_frame(64, 64, 7);
        let r = LivenessScorer::new().report(&frame);
        assert_eq!(r.sharpness, 1.0);
        assert_eq!(r.texture, 1.0);
        assert!(r.frequency > 0.9, "got {}", r.frequency);
        assert!(r.color > 0.8, "got {}", r.color);
        assert!(check_liveness(Some(&frame), 0.5));
        let (spoof, spoof_score) = detect_spoofing(&frame);
        assert!(!spoof);
        assert!((spoof_score - (1.0 - r.score)).abs() < 1e-12);
    }

    #[test]
    fn tiny_frame_texture_is_neutral() {
        let r = LivenessScorer::new().report(&noise_frame(2, 5, 3));
        assert_eq!(r.texture, 0.5);
    }

    #[test]
    fn absent_or_empty_frame_is_not_live() {
        assert!(!check_liveness(None, 0.0));
        assert!(!check_liveness(Some(&Frame::new(0, 0, vec![]).unwrap()), 0.0));
    }

    #[test]
    fn threshold_is_inclusive() {
        let frame = noise_frame(16, 16, 11);
        let score = calculate_liveness_score(&frame);
        assert!(check_liveness(Some(&frame), score));
        assert!(!check_liveness(Some(&frame), score + 1e-9));
    }

    #[test]
    fn check_uses_configured_threshold() {
        let frame = noise_frame(16, 16, 5);
        let scorer = LivenessScorer::with_config(LivenessConfig {
            threshold: 0.0,
            ..LivenessConfig::default()
        });
        assert!(scorer.check(Some(&frame)));
        assert!(!scorer.check(None));

        let strict = LivenessScorer::with_config(LivenessConfig {
            threshold: 1.1,
            ..LivenessConfig::default()
        });
        assert!(!strict.check(Some(&frame)));
    }

    #[test]
    fn score_is_deterministic() {
        let frame = noise_frame(40, 30, 99);
        let a = calculate_liveness_score(&frame);
        let b = calculate_liveness_score(&frame.clone());
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn score_in_unit_range() {
        for seed in 1..6 {
            let s = calculate_liveness_score(&noise_frame(9, 13, seed));
            assert!((0.0..=1.0).contains(&s), "got {s}");
        }
    }

    #[test]
    fn custom_weights_apply() {
        let cfg = LivenessConfig {
            weights: Weights {
                texture: 1.0,
                color: 0.0,
                frequency: 0.0,
                sharpness: 0.0,
            },
            ..LivenessConfig::default()
        };
        let s = LivenessScorer::with_config(cfg).score(&noise_frame(2, 2, 1));
        assert_eq!(s, 0.5);
    }
}
