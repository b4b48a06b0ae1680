//! Configuration file for the facegate CLI.
//!
//! Stored as YAML at ~/.facegate/config.yaml unless `--config` points
//! elsewhere. Absent or zero fields take their defaults.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use facegate_liveness::{DEFAULT_MAX_IMAGE_SIZE, LivenessConfig};

use crate::paths::{self, Paths};

const DEFAULT_DIMENSION: usize = 128;
const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;
const DEFAULT_LIVENESS_THRESHOLD: f64 = 0.5;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the index and registry files
    /// (default: ~/.facegate/data).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Embedding dimension.
    #[serde(default)]
    pub dimension: usize,

    /// Minimum match confidence.
    #[serde(default)]
    pub similarity_threshold: f64,

    /// Minimum liveness score.
    #[serde(default)]
    pub liveness_threshold: f64,

    /// Reject otherwise accepted requests that fail liveness.
    #[serde(default)]
    pub require_liveness: bool,

    /// Longest image side in pixels after decoding; larger frames are
    /// downsized. 0 means the default.
    #[serde(default)]
    pub max_image_size: usize,

    /// Liveness weights and normalization anchors.
    #[serde(default)]
    pub liveness: LivenessConfig,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

impl Config {
    /// Fills zero or absent fields with defaults. `paths` supplies the
    /// default data directory.
    pub fn with_defaults(mut self, paths: &Paths) -> Self {
        if self.data_dir.is_none() {
            self.data_dir = Some(paths.data_dir());
        }
        if self.dimension == 0 {
            self.dimension = DEFAULT_DIMENSION;
        }
        if self.similarity_threshold == 0.0 {
            self.similarity_threshold = DEFAULT_SIMILARITY_THRESHOLD;
        }
        if self.liveness_threshold == 0.0 {
            self.liveness_threshold = DEFAULT_LIVENESS_THRESHOLD;
        }
        if self.max_image_size == 0 {
            self.max_image_size = DEFAULT_MAX_IMAGE_SIZE;
        }
        self
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Data directory; empty until [`Config::with_defaults`] has run or the
    /// file sets one.
    pub fn data_dir(&self) -> &Path {
        self.data_dir.as_deref().unwrap_or(Path::new(""))
    }

    /// Index vector file.
    pub fn index_path(&self) -> PathBuf {
        paths::index_path(self.data_dir())
    }

    /// Registry file.
    pub fn registry_path(&self) -> PathBuf {
        paths::registry_path(self.data_dir())
    }

    /// Lock file guarding the index and registry.
    pub fn lock_path(&self) -> PathBuf {
        paths::lock_path(self.data_dir())
    }

    /// Engine configuration.
    pub fn engine_config(&self) -> facegate_faceid::Config {
        facegate_faceid::Config {
            dim: self.dimension,
            similarity_threshold: self.similarity_threshold,
            liveness_threshold: self.liveness_threshold,
            require_liveness: self.require_liveness,
        }
    }

    /// Liveness scorer configuration; its threshold follows
    /// `liveness_threshold`.
    pub fn liveness_config(&self) -> LivenessConfig {
        LivenessConfig {
            threshold: self.liveness_threshold,
            ..self.liveness.clone()
        }
    }

    /// Saves the configuration to its file.
    pub fn save(&self) -> anyhow::Result<()> {
        write_config(&self.config_path, self)
    }
}

fn resolve_path(paths: &Paths, custom_path: Option<&Path>) -> PathBuf {
    match custom_path {
        Some(p) => p.to_path_buf(),
        None => paths.config_file(),
    }
}

fn write_config(path: &Path, config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create config dir {}", parent.display()))?;
    }
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content).with_context(|| format!("write config {}", path.display()))?;
    Ok(())
}

/// Loads the configuration, with defaults applied. A missing file is not an
/// error; the defaults are used and nothing is written.
pub fn load_config(paths: &Paths, custom_path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = resolve_path(paths, custom_path);

    let cfg: Config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("read config {}", config_path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("parse config {}", config_path.display()))?
    } else {
        Config::default()
    };

    let mut cfg = cfg.with_defaults(paths);
    cfg.config_path = config_path;
    Ok(cfg)
}

/// Saves configuration to the custom path or the default location.
pub fn save_config(
    paths: &Paths,
    config: &Config,
    custom_path: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    let config_path = resolve_path(paths, custom_path);
    write_config(&config_path, config)?;
    Ok(config_path)
}
