//! Centralized error handling for the clearlogo engine
//!
//! Internal components (API client, storage tiers, fetch queue) return typed
//! errors from this module. The public resolver surface never propagates them:
//! every failure mode flattens to a missing-logo outcome, and the error values
//! only show up in logs.

pub mod types;

pub use types::*;

/// Convenience type alias for metadata API Results
pub type ApiResult<T> = Result<T, ApiError>;

/// Convenience type alias for storage Results
pub type StorageResult<T> = Result<T, StorageError>;
