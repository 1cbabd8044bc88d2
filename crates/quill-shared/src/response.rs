//! Standardized API error envelope.
//!
//! Every failure returns a JSON body with a human-readable `message` field.
//! Internal error detail is logged server-side, never echoed to clients.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The HTTP status code.
    pub status: u16,

    /// A short, stable summary of the failure class.
    pub error: String,

    /// A human-readable explanation specific to this occurrence.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, "Bad Request", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, "Unauthorized", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, "Forbidden", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, "Not Found", message)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error", "Something went wrong")
    }

    pub fn storage_unavailable() -> Self {
        Self::new(
            500,
            "Storage Unavailable",
            "The data store did not respond in time",
        )
    }
}
