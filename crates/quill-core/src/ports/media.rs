//! Media storage port - durable persistence for validated uploads.

use async_trait::async_trait;

/// Receipt for a stored file.
#[derive(Debug, Clone)]
pub struct StoredMedia {
    pub filename: String,
    pub size: u64,
}

/// Media storage errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Upload directory is not writable: {0}")]
    NotWritable(String),

    #[error("Storage I/O failure: {0}")]
    Io(String),
}

/// Durable storage for uploaded files.
///
/// Writes are not transactional with any database work the caller performs
/// afterwards - a failed caller leaves the file behind.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist the bytes under a freshly generated name with the given
    /// (dot-prefixed, lowercased) extension.
    async fn store(&self, extension: &str, bytes: &[u8]) -> Result<StoredMedia, MediaError>;

    /// Best-effort removal of a previously stored file. Removing a file
    /// that no longer exists is not an error.
    async fn remove(&self, filename: &str) -> Result<(), MediaError>;
}
