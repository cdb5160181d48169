//! In-memory file registry.
//!
//! Volatile by nature: contents live as long as the process and are gone after a restart.

pub mod models;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use models::{FileId, FileRecord};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("File id already registered: {0}")]
    DuplicateId(FileId),
}

/// Shared, cloneable handle onto the registry map.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    files: Arc<RwLock<HashMap<FileId, FileRecord>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record. Ids are unique for the life of the process.
    pub fn insert(&self, record: FileRecord) -> Result<(), RegistryError> {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        if files.contains_key(&record.id) {
            return Err(RegistryError::DuplicateId(record.id));
        }
        files.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn get(&self, id: &FileId) -> Option<FileRecord> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        files.get(id).cloned()
    }

    /// Bump the download counter, returning the new count, or `None` for an unknown id.
    pub fn record_download(&self, id: &FileId) -> Option<u64> {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        let record = files.get_mut(id)?;
        record.download_count += 1;
        Some(record.download_count)
    }

    pub fn len(&self) -> usize {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
