//! Upload constraints.
//!
//! Checks are applied in a fixed order: file presence, declared MIME type,
//! file extension, then size.

use std::path::Path;

/// Upload validation failures.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Invalid file type '{0}'. Only JPEG, PNG and GIF images are allowed")]
    InvalidType(String),

    #[error("Invalid file extension '{0}'. Only .jpg, .jpeg, .png and .gif files are allowed")]
    InvalidExtension(String),

    #[error("File is too large. The limit is {0} bytes")]
    TooLarge(usize),
}

/// Constraints applied to a single uploaded file.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_bytes: usize,
    allowed_mime: &'static [&'static str],
    allowed_extensions: &'static [&'static str],
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            allowed_mime: &["image/jpeg", "image/png", "image/gif"],
            allowed_extensions: &[".jpg", ".jpeg", ".png", ".gif"],
        }
    }
}

impl UploadPolicy {
    /// Validate the declared MIME type.
    pub fn check_mime(&self, mime: &str) -> Result<(), UploadError> {
        if self.allowed_mime.contains(&mime) {
            Ok(())
        } else {
            Err(UploadError::InvalidType(mime.to_string()))
        }
    }

    /// Validate the filename's extension; returns it lowercased with its
    /// leading dot, ready for filename generation.
    pub fn check_extension(&self, filename: &str) -> Result<String, UploadError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();

        if self.allowed_extensions.contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(UploadError::InvalidExtension(ext))
        }
    }

    /// Validate the total size.
    pub fn check_size(&self, size: usize) -> Result<(), UploadError> {
        if size <= self.max_bytes {
            Ok(())
        } else {
            Err(UploadError::TooLarge(self.max_bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_supported_images() {
        let policy = UploadPolicy::default();
        assert!(policy.check_mime("image/png").is_ok());
        assert!(policy.check_mime("image/jpeg").is_ok());
        assert!(policy.check_mime("image/gif").is_ok());
        assert_eq!(policy.check_extension("photo.PNG").unwrap(), ".png");
        assert_eq!(policy.check_extension("a.b.jpeg").unwrap(), ".jpeg");
    }

    #[test]
    fn test_rejects_wrong_mime() {
        let policy = UploadPolicy::default();
        assert_eq!(
            policy.check_mime("application/pdf"),
            Err(UploadError::InvalidType("application/pdf".to_string()))
        );
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let policy = UploadPolicy::default();
        assert_eq!(
            policy.check_extension("notes.txt"),
            Err(UploadError::InvalidExtension(".txt".to_string()))
        );
        assert_eq!(
            policy.check_extension("no-extension"),
            Err(UploadError::InvalidExtension(String::new()))
        );
    }

    #[test]
    fn test_size_limit_is_five_mebibytes() {
        let policy = UploadPolicy::default();
        assert!(policy.check_size(4 * 1024 * 1024).is_ok());
        assert!(policy.check_size(5 * 1024 * 1024).is_ok());
        assert_eq!(
            policy.check_size(6 * 1024 * 1024),
            Err(UploadError::TooLarge(5 * 1024 * 1024))
        );
    }
}
