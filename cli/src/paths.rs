//! Path utilities for facegate.

use std::io;
use std::path::{Path, PathBuf};

/// Default base directory name under the user's home.
pub const DEFAULT_BASE_DIR: &str = ".facegate";

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Vector file of the embedding index. Identity ids live next to it in
/// `faces.idx.meta`.
pub const INDEX_FILE: &str = "faces.idx";

/// Registry of enrolled identity ids.
pub const REGISTRY_FILE: &str = "registry.json";

/// Advisory lock file that serializes writers across processes.
pub const LOCK_FILE: &str = ".lock";

/// Provides access to the facegate directory structure.
#[derive(Debug, Clone)]
pub struct Paths {
    /// User's home directory.
    pub home_dir: PathBuf,
}

impl Paths {
    /// Resolves the current user's home directory.
    pub fn new() -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not find home directory")
        })?;
        Ok(Self { home_dir })
    }

    /// Uses `home_dir` instead of the real home directory.
    pub fn with_home(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
        }
    }

    /// Returns the base directory (~/.facegate).
    pub fn base_dir(&self) -> PathBuf {
        self.home_dir.join(DEFAULT_BASE_DIR)
    }

    /// Returns the config file path (~/.facegate/config.yaml).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir().join(DEFAULT_CONFIG_FILE)
    }

    /// Returns the default data directory (~/.facegate/data).
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir().join("data")
    }
}

/// Index vector file inside `data_dir`.
pub fn index_path(data_dir: &Path) -> PathBuf {
    data_dir.join(INDEX_FILE)
}

/// Registry file inside `data_dir`.
pub fn registry_path(data_dir: &Path) -> PathBuf {
    data_dir.join(REGISTRY_FILE)
}

/// Lock file inside `data_dir`.
pub fn lock_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOCK_FILE)
}
