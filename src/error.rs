//! Error types for files_uploader
//!
//! Upload failures are always scoped to a single file: they end up on that
//! file's row and in the log, never abort a batch.

use crate::utils::file_size::FileSizeUtils;
use std::path::PathBuf;
use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error during upload.";
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON response from server.";
pub const MISSING_URL_MESSAGE: &str = "Upload response did not contain a URL.";

/// Outcome of a failed single-file upload
#[derive(Error, Debug)]
pub enum UploadError {
    /// File is larger than the configured limit; never sent
    #[error("File size exceeds {} limit", readable(.limit))]
    OversizeFile { size: u64, limit: u64 },

    /// Transport failed before any response arrived
    #[error("Network error during upload.")]
    NetworkFailure { reason: String },

    /// Endpoint answered outside 2xx
    #[error("{detail}")]
    ServerError { status: u16, detail: String },

    /// 2xx answer that is not JSON or carries no `url`
    #[error("{0}")]
    MalformedResponse(&'static str),

    /// Payload could not be opened
    #[error("Failed to read file: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Row was removed while the file was queued or in flight
    #[error("Upload cancelled")]
    Cancelled,
}

impl UploadError {
    /// Errors that mark the row `TooLarge` rather than `Failed`
    pub fn is_oversize(&self) -> bool {
        matches!(self, UploadError::OversizeFile { .. })
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Maximum file size must be greater than zero")]
    ZeroSizeLimit,
}

fn readable(bytes: &u64) -> String {
    FileSizeUtils::format_size(*bytes)
}

pub type UploadResult<T> = std::result::Result<T, UploadError>;
