//! Error type definitions for the clearlogo engine
//!
//! A small hierarchy: `ApiError` covers the metadata provider boundary,
//! `StorageError` covers the key-value tiers, and `LogoError` is the
//! top-level type for constructors that touch both.

use thiserror::Error;

/// Top-level engine error type
#[derive(Error, Debug)]
pub enum LogoError {
    /// Metadata API errors
    #[error("metadata API error: {0}")]
    Api(#[from] ApiError),

    /// Key-value storage errors
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Metadata API specific errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failures (connect, timeout, TLS)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx responses from the images endpoint
    #[error("unexpected status {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    /// Malformed JSON in the images response
    #[error("failed to decode images response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client constructed without usable credentials
    #[error("metadata client not configured: {reason}")]
    NotConfigured { reason: String },
}

/// Key-value storage specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem failures in file-backed stores
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store contents that do not round-trip through serde
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failures reported by a host-provided backend
    #[error("storage backend error: {message}")]
    Backend { message: String },
}

impl ApiError {
    /// Create a not-configured error
    pub fn not_configured<S: Into<String>>(reason: S) -> Self {
        Self::NotConfigured {
            reason: reason.into(),
        }
    }
}

impl StorageError {
    /// Create a backend error from an arbitrary message
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
