//! Remote storage for crossword files.
//!
//! The reconciler and the uploader only talk to [`RemoteStore`]; the
//! production implementation is [`GoogleDrive`], and [`MemoryStore`] backs
//! the tests.

mod google;
mod memory;

pub use google::{Endpoints, GoogleDrive, DRIVE_SCOPE};
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Drive API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    NotFound(String),
}

/// A file in the remote folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,
}

/// Operations the reconciler and uploader need from a remote folder.
///
/// An implementation is bound to a single folder.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List every non-trashed file in the folder.
    async fn list(&self) -> Result<Vec<RemoteFile>, DriveError>;

    /// Rename a file. Content is untouched.
    async fn rename(&self, file_id: &str, new_name: &str) -> Result<RemoteFile, DriveError>;

    /// Download a file's content to `dest`, returning the byte count.
    async fn download(&self, file_id: &str, dest: &Path) -> Result<u64, DriveError>;

    /// Find a file in the folder by exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<RemoteFile>, DriveError>;

    /// Create a file in the folder, returning its id.
    async fn upload(&self, name: &str, mime_type: &str, data: Vec<u8>)
        -> Result<String, DriveError>;
}
