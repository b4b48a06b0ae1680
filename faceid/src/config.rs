use crate::FaceIdError;

/// Controls engine behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Embedding dimension (e.g. 128 for dlib-style face encodings).
    pub dim: usize,

    /// Minimum confidence `1 / (1 + distance)` for the nearest enrolled face
    /// to count as the same person. Default: 0.6.
    pub similarity_threshold: f64,

    /// Minimum liveness score for `liveness_passed`. Default: 0.5.
    pub liveness_threshold: f64,

    /// When true, an otherwise accepted request whose liveness check failed
    /// is rejected. When false (default), liveness is only reported.
    pub require_liveness: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dim: 128,
            similarity_threshold: 0.6,
            liveness_threshold: 0.5,
            require_liveness: false,
        }
    }
}

impl Config {
    /// Default config for the given dimension.
    pub fn with_dim(dim: usize) -> Self {
        Self {
            dim,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), FaceIdError> {
        if self.dim == 0 {
            return Err(FaceIdError::InvalidConfig("dim must be positive".into()));
        }
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(FaceIdError::InvalidConfig(format!(
                "similarity_threshold {} not in (0, 1]",
                self.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.liveness_threshold) {
            return Err(FaceIdError::InvalidConfig(format!(
                "liveness_threshold {} not in [0, 1]",
                self.liveness_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.dim, 128);
        assert_eq!(cfg.similarity_threshold, 0.6);
        assert_eq!(cfg.liveness_threshold, 0.5);
        assert!(!cfg.require_liveness);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_values() {
        assert!(Config::with_dim(0).validate().is_err());
        let mut cfg = Config::with_dim(4);
        cfg.similarity_threshold = 0.0;
        assert!(cfg.validate().is_err());
        cfg.similarity_threshold = 1.5;
        assert!(cfg.validate().is_err());
        cfg.similarity_threshold = f64::NAN;
        assert!(cfg.validate().is_err());
        cfg.similarity_threshold = 0.6;
        cfg.liveness_threshold = -0.1;
        assert!(cfg.validate().is_err());
    }
}
