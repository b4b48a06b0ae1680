use std::collections::HashSet;

use parking_lot::Mutex;

use crate::FaceIdError;

/// Authoritative set of identities that have completed enrollment.
///
/// The engine records an identity when it accepts a new enrollment, before
/// writing the face to the index, and forgets it again if that write fails.
/// Implementations must be safe for concurrent use.
pub trait IdentityRegistry: Send + Sync {
    /// Returns true if the identity is enrolled.
    fn exists(&self, id: &str) -> Result<bool, FaceIdError>;

    /// Marks the identity as enrolled.
    fn record(&self, id: &str) -> Result<(), FaceIdError>;

    /// Undoes [`IdentityRegistry::record`] for an enrollment that could not
    /// be completed.
    fn forget(&self, id: &str) -> Result<(), FaceIdError>;
}

/// In-memory [`IdentityRegistry`].
/// Data is lost on restart. Suitable for testing or ephemeral use.
#[derive(Default)]
pub struct MemoryRegistry {
    ids: Mutex<HashSet<String>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that already knows the given identities.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Mutex::new(ids.into_iter().map(Into::into).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityRegistry for MemoryRegistry {
    fn exists(&self, id: &str) -> Result<bool, FaceIdError> {
        Ok(self.ids.lock().contains(id))
    }

    fn record(&self, id: &str) -> Result<(), FaceIdError> {
        self.ids.lock().insert(id.to_string());
        Ok(())
    }

    fn forget(&self, id: &str) -> Result<(), FaceIdError> {
        self.ids.lock().remove(id);
        Ok(())
    }
}
