//! Error types for the gallery server
//!
//! Provides the store, thumbnail and gallery error enums using thiserror,
//! along with their HTTP mappings.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Failures raised by the persistent cache store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Database directory could not be prepared
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A key read by the transaction changed before it could commit
    #[error("Transaction conflict on key: {key}")]
    Conflict { key: String },

    /// A backend lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    LockPoisoned,
}

// == Thumbnail Error Enum ==
/// Failures raised while serving a thumbnail.
#[derive(Error, Debug)]
pub enum ThumbnailError {
    /// Key is empty, absolute or escapes the served directory
    #[error("Invalid thumbnail key: {key}")]
    InvalidKey { key: String },

    /// Source image is missing or unreadable
    #[error("Source image not found: {}", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source bytes are not a decodable JPEG
    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    /// Resized image could not be encoded
    #[error("Failed to encode thumbnail: {0}")]
    EncodeFailed(String),

    /// Store transaction failed or aborted
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(#[from] StoreError),

    /// Blocking worker failed to complete
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Gallery Error Enum ==
/// Failures raised while rendering the gallery page.
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Directory enumeration failed
    #[error("Failed to list images in {}: {source}", path.display())]
    ListingFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// == IntoResponse Implementations ==
impl IntoResponse for ThumbnailError {
    fn into_response(self) -> Response {
        let status = match &self {
            ThumbnailError::InvalidKey { .. } => StatusCode::BAD_REQUEST,
            ThumbnailError::SourceNotFound { .. } => StatusCode::NOT_FOUND,
            ThumbnailError::DecodeFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ThumbnailError::EncodeFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ThumbnailError::CacheUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ThumbnailError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error_response(status, self.to_string())
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        error_response(StatusCode::SERVICE_UNAVAILABLE, self.to_string())
    }
}

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}
