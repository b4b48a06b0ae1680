//! Cross-process lock on the data directory.

use std::fs::{self, File, OpenOptions};
use std::path::Path;

use anyhow::Context as _;
use tracing::debug;

/// How a command uses the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Readers (identify, stats) may run together.
    Shared,
    /// A writer (enroll, verify) runs alone, from loading the index until
    /// its enrollment is on disk.
    Exclusive,
}

/// Advisory lock on `<data_dir>/.lock`, released on drop.
///
/// The engine's own mutex only orders threads within one process; this
/// keeps two `facegate` processes from deciding against the same stale copy
/// of the index.
pub struct DataLock {
    _file: File,
}

impl DataLock {
    /// Blocks until the lock at `path` is held in `mode`.
    pub fn acquire(path: &Path, mode: LockMode) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create data dir {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .with_context(|| format!("open lock {}", path.display()))?;

        match mode {
            LockMode::Shared => file.lock_shared(),
            LockMode::Exclusive => file.lock(),
        }
        .with_context(|| format!("lock {}", path.display()))?;
        debug!(path = %path.display(), ?mode, "data lock held");

        Ok(Self { _file: file })
    }
}
