use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, error, info};

use crate::error::VecError;
use crate::flat::{search_rows, FlatIndex, FlatInner};
use crate::flat_io::{load_ids, load_vectors, save_ids, save_vectors};
use crate::vecstore::{Match, VecIndex};

/// Returns the id-list path that accompanies a vector blob path
/// (`faces.idx` -> `faces.idx.meta`).
pub fn meta_path(path: &Path) -> PathBuf {
    let mut p = path.as_os_str().to_owned();
    p.push(".meta");
    PathBuf::from(p)
}

/// DiskIndex is a [`FlatIndex`] persisted to two co-located files.
///
/// Every successful [`VecIndex::insert`] has already rewritten both files
/// (two synced temp files, then two renames). If the write fails the
/// in-memory row is dropped again, the files are left at their previous
/// contents, and the error is returned.
pub struct DiskIndex {
    flat: FlatIndex,
    vectors_path: PathBuf,
    ids_path: PathBuf,
}

impl DiskIndex {
    /// Opens the index stored at `path` (and `path.meta`), or starts an empty
    /// one if neither file exists. Nothing is written until the first insert.
    ///
    /// Fails if only one of the two files exists, if their row counts
    /// disagree, or if the stored dimension is not `dim`.
    pub fn open(path: impl AsRef<Path>, dim: usize) -> Result<Self, VecError> {
        let vectors_path = path.as_ref().to_path_buf();
        let ids_path = meta_path(&vectors_path);

        let flat = match (vectors_path.exists(), ids_path.exists()) {
            (false, false) => {
                info!(path = %vectors_path.display(), dim, "starting empty index");
                FlatIndex::new(dim)?
            }
            (true, false) => {
                return Err(VecError::TornIndex {
                    present: vectors_path,
                    missing: ids_path,
                });
            }
            (false, true) => {
                return Err(VecError::TornIndex {
                    present: ids_path,
                    missing: vectors_path,
                });
            }
            (true, true) => {
                let (file_dim, data) = load_vectors(&mut File::open(&vectors_path)?)?;
                if file_dim != dim {
                    return Err(VecError::DimensionMismatch {
                        got: file_dim,
                        want: dim,
                    });
                }
                let ids = load_ids(&mut File::open(&ids_path)?)?;
                let flat = FlatIndex::from_parts(dim, ids, data)?;
                info!(
                    path = %vectors_path.display(),
                    dim,
                    entries = flat.len(),
                    "loaded index"
                );
                flat
            }
        };

        Ok(Self {
            flat,
            vectors_path,
            ids_path,
        })
    }

    /// Path of the vector blob.
    pub fn path(&self) -> &Path {
        &self.vectors_path
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.flat.ids()
    }

    /// Writes both files for `inner`, whose last row is the one being added.
    ///
    /// Both temp files are written and synced before either is renamed. If
    /// the id list cannot be renamed into place, the vector blob is put back
    /// to its previous rows (or removed if this was the first insert).
    fn persist(&self, inner: &FlatInner) -> Result<(), VecError> {
        let vectors = stage(&self.vectors_path, |w| save_vectors(inner.dim, &inner.data, w))?;
        let ids = stage(&self.ids_path, |w| save_ids(&inner.ids, w))?;

        let had_vectors = self.vectors_path.exists();
        vectors
            .persist(&self.vectors_path)
            .map_err(|e| VecError::Io(e.error))?;
        if let Err(e) = ids.persist(&self.ids_path) {
            let prev = &inner.data[..inner.rows().saturating_sub(1) * inner.dim];
            if let Err(restore) = self.restore_vectors(inner.dim, prev, had_vectors) {
                error!(
                    path = %self.vectors_path.display(),
                    error = %restore,
                    "could not restore vector file after failed id write"
                );
            }
            return Err(VecError::Io(e.error));
        }
        Ok(())
    }

    fn restore_vectors(
        &self,
        dim: usize,
        prev: &[f32],
        had_vectors: bool,
    ) -> Result<(), VecError> {
        if !had_vectors {
            fs::remove_file(&self.vectors_path)?;
            return Ok(());
        }
        stage(&self.vectors_path, |w| save_vectors(dim, prev, w))?
            .persist(&self.vectors_path)
            .map_err(|e| VecError::Io(e.error))?;
        Ok(())
    }
}

impl VecIndex for DiskIndex {
    fn insert(&self, id: &str, vector: &[f32]) -> Result<(), VecError> {
        let mut inner = self.flat.write_inner();
        inner.check_vector(vector)?;
        inner.push(id, vector);
        if let Err(e) = self.persist(&inner) {
            inner.pop();
            return Err(e);
        }
        debug!(id, entries = inner.rows(), "persisted index");
        Ok(())
    }

    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Match>, VecError> {
        let inner = self.flat.read_inner();
        inner.check_vector(query)?;
        Ok(search_rows(&inner, query, top_k))
    }

    fn len(&self) -> usize {
        self.flat.len()
    }

    fn dim(&self) -> usize {
        self.flat.dim()
    }
}

/// Writes and syncs a temp file next to `path`, ready to be persisted over it.
fn stage<F>(path: &Path, write: F) -> Result<NamedTempFile, VecError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), VecError>,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}
