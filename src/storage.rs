/// Preference persistence on top of window.localStorage

use crate::project::Project;

/// Failure reported by a storage backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Storage is disabled or missing (privacy mode, sandboxed frame)
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage read failed: {0}")]
    Read(String),
    /// Includes quota errors
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Key-value storage the preference is kept in
pub trait PreferenceBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// The single stored project preference
///
/// Backend failures never reach the caller: a failed read is treated as
/// "nothing stored" and a failed write is dropped.
pub struct PreferenceStore<B> {
    backend: B,
    key: String,
}

impl<B: PreferenceBackend> PreferenceStore<B> {
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        PreferenceStore {
            backend,
            key: key.into(),
        }
    }

    pub fn get(&self) -> Option<String> {
        match self.backend.read(&self.key) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("Ignoring preference read failure: {}", e);
                None
            }
        }
    }

    pub fn set(&self, value: &str) {
        if let Err(e) = self.backend.write(&self.key, value) {
            log::debug!("Ignoring preference write failure: {}", e);
        }
    }

    /// Stored preference, if it names a known project
    pub fn get_project(&self) -> Option<Project> {
        self.get().as_deref().and_then(Project::from_stored)
    }
}

/// Backend over `window.localStorage`
///
/// The storage object is looked up on every access; browsers may throw
/// merely for touching `localStorage`, and that must not be fatal.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .map_err(|_| StorageError::Unavailable)?
            .ok_or(StorageError::Unavailable)
    }
}

impl PreferenceBackend for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Read(format!("{:?}", e)))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }
}
