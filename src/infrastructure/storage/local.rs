use std::{
    ffi::OsStr,
    io,
    path::{Component, Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::StorageError;

use super::{FileResource, FileStore};

/// Prefix of in-flight uploads. Hidden from listings and swept on `init`.
const TEMP_PREFIX: &str = ".upload-";

/// Attempts at finding a free `<uuid>_<name>` once the suggested name is taken.
const MAX_NAME_ATTEMPTS: u32 = 3;

/// [`FileStore`] backed by one directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalFileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let name = validate_file_name(filename)?;
        Ok(self.root.join(name))
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(format!("{}{}", TEMP_PREFIX, Uuid::new_v4().simple()))
    }

    /// Permission bits do not reflect ownership or mount flags; only a real write does.
    async fn check_writable(&self) -> Result<(), StorageError> {
        let marker = self.temp_path();

        write_synced(&marker, b"").await.map_err(|e| {
            StorageError::Init(format!("{} is not writable: {}", self.root.display(), e))
        })?;

        fs::remove_file(&marker)
            .await
            .map_err(|e| StorageError::Init(format!("cleaning up {}: {}", marker.display(), e)))
    }

    async fn sweep_partial_uploads(&self) -> Result<(), StorageError> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StorageError::Init(format!("listing {}: {}", self.root.display(), e)))?;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(TEMP_PREFIX) {
                if let Err(e) = fs::remove_file(entry.path()).await {
                    warn!("Could not remove partial upload {:?}: {}", name, e);
                }
            }
        }

        Ok(())
    }
}

/// Accepts only names that denote a direct child of the storage root.
pub fn validate_file_name(filename: &str) -> Result<&str, StorageError> {
    if filename.trim().is_empty() {
        return Err(StorageError::Security("file name must not be empty".into()));
    }
    if filename.contains(['/', '\\', '\0']) {
        return Err(StorageError::Security(format!(
            "cannot store file outside the storage directory: {filename}"
        )));
    }
    if filename.starts_with('.') {
        return Err(StorageError::Security(format!("hidden or relative file name: {filename}")));
    }

    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == OsStr::new(filename) => Ok(filename),
        _ => Err(StorageError::Security(format!(
            "cannot store file outside the storage directory: {filename}"
        ))),
    }
}

fn io_failure(action: &str, target: &Path, err: io::Error) -> StorageError {
    StorageError::Io(format!("{} {}: {}", action, target.display(), err))
}

async fn write_synced(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(content).await?;
    file.sync_all().await
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn init(&self) -> Result<(), StorageError> {
        match fs::metadata(&self.root).await {
            Ok(meta) if !meta.is_dir() => {
                return Err(StorageError::Init(format!(
                    "{} exists and is not a directory",
                    self.root.display()
                )));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.root)
                    .await
                    .map_err(|e| StorageError::Init(format!("creating {}: {}", self.root.display(), e)))?;
                info!("Created storage directory {}", self.root.display());
            }
            Err(e) => {
                return Err(StorageError::Init(format!("inspecting {}: {}", self.root.display(), e)));
            }
        }

        self.sweep_partial_uploads().await?;
        self.check_writable().await
    }

    async fn store(&self, content: &[u8], suggested_name: &str) -> Result<String, StorageError> {
        let name = validate_file_name(suggested_name)?;

        let temp = self.temp_path();

        if let Err(e) = write_synced(&temp, content).await {
            let _ = fs::remove_file(&temp).await;
            return Err(io_failure("writing", &temp, e));
        }

        // hard_link refuses to replace an existing file, so the final name is
        // claimed atomically even when uploads with the same name race.
        let mut filename = name.to_string();
        let mut attempts = 0;
        let claimed = loop {
            let target = self.root.join(&filename);
            match fs::hard_link(&temp, &target).await {
                Ok(()) => break Ok(()),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && attempts < MAX_NAME_ATTEMPTS => {
                    attempts += 1;
                    filename = format!("{}_{}", Uuid::new_v4().simple(), name);
                }
                Err(e) => break Err(io_failure("linking upload to", &target, e)),
            }
        };

        if let Err(e) = fs::remove_file(&temp).await {
            warn!("Could not remove temporary upload {}: {}", temp.display(), e);
        }
        claimed?;

        debug!("Stored {} ({} bytes)", filename, content.len());
        Ok(filename)
    }

    async fn load(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let path = self.resolve(filename)?;

        let resolved = fs::canonicalize(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(filename.to_string()),
            _ => io_failure("resolving", &path, e),
        })?;
        let root = fs::canonicalize(&self.root)
            .await
            .map_err(|e| io_failure("resolving", &self.root, e))?;

        // A symlink planted in the root must not lead anywhere else.
        if resolved.parent() != Some(root.as_path()) {
            return Err(StorageError::Security(format!(
                "{filename} resolves outside the storage directory"
            )));
        }
        if !resolved.is_file() {
            return Err(StorageError::NotFound(filename.to_string()));
        }

        Ok(resolved)
    }

    async fn load_as_resource(&self, filename: &str) -> Result<Option<FileResource>, StorageError> {
        match self.load(filename).await {
            Ok(path) => Ok(Some(FileResource {
                filename: filename.to_string(),
                path,
            })),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_all(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| io_failure("listing", &self.root, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_failure("listing", &self.root, e))?
        {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if is_file && !name.starts_with('.') {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    async fn delete(&self, filename: &str) -> Result<bool, StorageError> {
        let path = self.resolve(filename)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted {}", filename);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_failure("deleting", &path, e)),
        }
    }

    async fn delete_all(&self) -> Result<(), StorageError> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {
                info!("Removed storage directory {}", self.root.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_failure("removing", &self.root, e)),
        }
    }

    async fn exists(&self, filename: &str) -> Result<bool, StorageError> {
        let path = self.resolve(filename)?;

        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_failure("inspecting", &path, e)),
        }
    }
}
