use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::errors::StorageError;

pub mod local;

pub use local::LocalFileStore;

/// Named byte-blob storage rooted at a single flat directory.
///
/// Every `filename` argument must name a direct child of the root; anything
/// else fails with [`StorageError::Security`] before touching the disk.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Creates the root directory if needed. Safe to call repeatedly.
    async fn init(&self) -> Result<(), StorageError>;

    /// Writes `content` and returns the filename it was stored under, which
    /// differs from `suggested_name` when that name is already taken.
    async fn store(&self, content: &[u8], suggested_name: &str) -> Result<String, StorageError>;

    /// Absolute path of an existing file.
    async fn load(&self, filename: &str) -> Result<PathBuf, StorageError>;

    /// Like [`FileStore::load`], but a missing file is `Ok(None)`.
    async fn load_as_resource(&self, filename: &str) -> Result<Option<FileResource>, StorageError>;

    /// Names of all stored files. Each call re-reads the directory.
    async fn list_all(&self) -> Result<Vec<String>, StorageError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, filename: &str) -> Result<bool, StorageError>;

    /// Removes the root and everything in it. The store needs `init` before reuse.
    async fn delete_all(&self) -> Result<(), StorageError>;

    async fn exists(&self, filename: &str) -> Result<bool, StorageError>;
}

/// Handle to a stored file, resolved against the storage root.
#[derive(Debug, Clone, PartialEq)]
pub struct FileResource {
    pub filename: String,
    pub path: PathBuf,
}

impl FileResource {
    pub async fn read(&self) -> Result<Vec<u8>, StorageError> {
        fs::read(&self.path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(self.filename.clone()),
            _ => StorageError::Io(format!("reading {}: {}", self.filename, e)),
        })
    }
}
