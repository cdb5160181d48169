use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::{ObjectMeta, ObjectReader, ObjectStore, ObjectStoreError};

/// Local filesystem object store rooted at the upload directory.
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    /// Create the directory (recursively) and prove it is writable.
    ///
    /// Failing here is a startup precondition: callers should refuse to serve.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, ObjectStoreError> {
        let base_path = base_path.as_ref().to_path_buf();
        let not_writable = |source| ObjectStoreError::NotWritable {
            path: base_path.display().to_string(),
            source,
        };

        std::fs::create_dir_all(&base_path).map_err(not_writable)?;

        let probe = base_path.join(format!(".write-probe-{}", uuid::Uuid::new_v4().simple()));
        std::fs::write(&probe, b"probe").map_err(not_writable)?;
        std::fs::remove_file(&probe).map_err(not_writable)?;

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
        if !valid {
            return Err(ObjectStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(key))
    }
}

fn not_found_or_io(key: &str, e: std::io::Error) -> ObjectStoreError {
    if e.kind() == ErrorKind::NotFound {
        ObjectStoreError::NotFound(key.to_string())
    } else {
        ObjectStoreError::Io(e)
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    /// Write a new object. Existing objects are never overwritten, and a failed
    /// write leaves nothing behind.
    async fn put(&self, key: &str, data: Bytes) -> Result<(), ObjectStoreError> {
        let path = self.object_path(key)?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    ObjectStoreError::AlreadyExists(key.to_string())
                } else {
                    ObjectStoreError::Io(e)
                }
            })?;

        let written = async {
            file.write_all(&data).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                tracing::warn!(key, error = %cleanup, "Failed to remove partial object");
            }
            return Err(ObjectStoreError::Io(e));
        }
        Ok(())
    }

    async fn open(&self, key: &str) -> Result<ObjectReader, ObjectStoreError> {
        let path = self.object_path(key)?;
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| not_found_or_io(key, e))?;
        let size = file.metadata().await?.len();
        Ok(ObjectReader { file, size })
    }

    async fn stat(&self, key: &str) -> Result<ObjectMeta, ObjectStoreError> {
        let path = self.object_path(key)?;
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| not_found_or_io(key, e))?;

        let created_at = meta
            .created()
            .or_else(|_| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(ObjectMeta {
            size: meta.len(),
            created_at,
        })
    }

    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        let path = self.object_path(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}
