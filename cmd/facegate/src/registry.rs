//! Identity registry persisted as a JSON array of ids.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use facegate_faceid::{FaceIdError, IdentityRegistry};
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::info;

/// Registry of enrolled identities kept in a JSON file.
///
/// Every `record` or `forget` rewrites the whole file through a temp file
/// and rename.
pub struct FileRegistry {
    path: PathBuf,
    ids: Mutex<BTreeSet<String>>,
}

impl FileRegistry {
    /// Loads the registry at `path`. When the file does not exist yet it is
    /// seeded from `seed` (normally the ids already in the index) and
    /// written out.
    pub fn open<I>(path: impl Into<PathBuf>, seed: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let path = path.into();
        if path.exists() {
            let data =
                fs::read(&path).with_context(|| format!("read registry {}", path.display()))?;
            let ids: BTreeSet<String> = serde_json::from_slice(&data)
                .with_context(|| format!("parse registry {}", path.display()))?;
            info!(path = %path.display(), identities = ids.len(), "registry loaded");
            return Ok(Self {
                path,
                ids: Mutex::new(ids),
            });
        }

        let ids: BTreeSet<String> = seed.into_iter().collect();
        write_atomic(&path, &ids)?;
        info!(path = %path.display(), identities = ids.len(), "registry created");
        Ok(Self {
            path,
            ids: Mutex::new(ids),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }
}

impl IdentityRegistry for FileRegistry {
    fn exists(&self, identity: &str) -> Result<bool, FaceIdError> {
        Ok(self.ids.lock().contains(identity))
    }

    fn record(&self, identity: &str) -> Result<(), FaceIdError> {
        let mut ids = self.ids.lock();
        if !ids.insert(identity.to_string()) {
            return Ok(());
        }
        if let Err(e) = write_atomic(&self.path, &ids) {
            ids.remove(identity);
            return Err(FaceIdError::Registry(format!("{e:#}")));
        }
        Ok(())
    }

    fn forget(&self, identity: &str) -> Result<(), FaceIdError> {
        let mut ids = self.ids.lock();
        if !ids.remove(identity) {
            return Ok(());
        }
        if let Err(e) = write_atomic(&self.path, &ids) {
            ids.insert(identity.to_string());
            return Err(FaceIdError::Registry(format!("{e:#}")));
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, ids: &BTreeSet<String>) -> anyhow::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    serde_json::to_writer_pretty(&mut tmp, ids)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
