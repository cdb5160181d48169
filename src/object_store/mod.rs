mod local;

pub use local::LocalStore;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Object already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid object key: {0:?}")]
    InvalidKey(String),
    #[error("Storage directory {path} is not writable: {source}")]
    NotWritable {
        path: String,
        source: std::io::Error,
    },
}

/// Filesystem facts about a stored object.
#[derive(Debug, Clone)]
pub struct ObjectMeta {
    pub size: u64,
    /// Birth time where the platform reports it, otherwise modification time.
    pub created_at: Option<DateTime<Utc>>,
}

/// An opened object, ready to be streamed.
pub struct ObjectReader {
    pub file: tokio::fs::File,
    pub size: u64,
}

/// Abstraction over where uploaded bytes live.
/// Keys are generated stored filenames -- the raw blobs are meaningless without the registry.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), ObjectStoreError>;
    async fn open(&self, key: &str) -> Result<ObjectReader, ObjectStoreError>;
    async fn stat(&self, key: &str) -> Result<ObjectMeta, ObjectStoreError>;
    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError>;
}
