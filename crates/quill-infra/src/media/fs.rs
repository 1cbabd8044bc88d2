//! Filesystem media store.
//!
//! Files are written into a single flat directory under generated names of
//! the form `{unixMillis}-{random}{ext}`. Uniqueness is probabilistic, not
//! guaranteed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use quill_core::ports::{MediaError, MediaStore, StoredMedia};

pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    /// Open the store, creating the directory if absent and verifying it is
    /// writable before the server starts taking uploads.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, MediaError> {
        let root = root.into();

        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| MediaError::NotWritable(e.to_string()))?;

        // Writability probe: a failed create here is a config problem the
        // operator should hear about at startup, not on the first upload.
        let probe = root.join(format!(".probe-{}", rand::thread_rng().gen_range(0..u32::MAX)));
        tokio::fs::write(&probe, b"")
            .await
            .map_err(|e| MediaError::NotWritable(e.to_string()))?;
        tokio::fs::remove_file(&probe)
            .await
            .map_err(|e| MediaError::NotWritable(e.to_string()))?;

        tracing::info!(dir = %root.display(), "Upload directory ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn generate_filename(extension: &str) -> String {
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        format!("{}-{}{}", Utc::now().timestamp_millis(), suffix, extension)
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn store(&self, extension: &str, bytes: &[u8]) -> Result<StoredMedia, MediaError> {
        // Re-create the directory in case it was removed while running.
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| MediaError::NotWritable(e.to_string()))?;

        let filename = Self::generate_filename(extension);
        let path = self.root.join(&filename);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;

        tracing::debug!(file = %filename, size = bytes.len(), "Stored upload");

        Ok(StoredMedia {
            filename,
            size: bytes.len() as u64,
        })
    }

    async fn remove(&self, filename: &str) -> Result<(), MediaError> {
        // Names are generated flat; anything path-like did not come from us.
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(MediaError::Io(format!(
                "refusing suspicious filename '{filename}'"
            )));
        }

        match tokio::fs::remove_file(self.root.join(filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaError::Io(e.to_string())),
        }
    }
}
