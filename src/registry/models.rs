use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The only content type the service accepts or serves.
pub const PDF_MIME: &str = "application/pdf";

/// Server-generated opaque identifier: a v4 UUID rendered as 32 lowercase hex characters.
///
/// Anything that does not have exactly that shape is never a valid key, so a
/// parsed `FileId` is always safe to use as a path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub const LEN: usize = 32;

    pub fn generate() -> Self {
        FileId(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let well_formed = raw.len() == Self::LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| FileId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the file inside the storage directory.
    pub fn stored_filename(&self) -> String {
        format!("{}.pdf", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub stored_filename: String,
    /// Client supplied, untrusted. Display and Content-Disposition only.
    pub original_name: String,
    pub size: u64,
    pub upload_time: DateTime<Utc>,
    pub mimetype: String,
    pub download_count: u64,
}

impl FileRecord {
    /// A fresh record for bytes already written under `id.stored_filename()`.
    pub fn new(id: FileId, original_name: impl Into<String>, size: u64) -> Self {
        FileRecord {
            stored_filename: id.stored_filename(),
            id,
            original_name: original_name.into(),
            size,
            upload_time: Utc::now(),
            mimetype: PDF_MIME.to_string(),
            download_count: 0,
        }
    }
}
