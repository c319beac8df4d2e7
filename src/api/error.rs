use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::services::storage::StorageError;

/// Body of every error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Description of the error that occurred
    pub detail: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    /// Maps a failed storage write onto the HTTP error the client sees.
    /// Body read failures surface as the multipart error that caused them.
    pub fn from_storage(err: StorageError, size_label: &str) -> Self {
        match err {
            StorageError::TooLarge { .. } => too_large(size_label),
            StorageError::Prepare(e) => {
                AppError::Internal(format!("Failed to prepare upload directory: {}", e))
            }
            StorageError::Io(e) => {
                let multipart = e
                    .get_ref()
                    .and_then(|inner| inner.downcast_ref::<MultipartError>());
                match multipart {
                    Some(mp) => AppError::from_multipart(mp, size_label),
                    None => AppError::Internal(format!("Failed to store the uploaded file: {}", e)),
                }
            }
        }
    }

    pub fn from_multipart(err: &MultipartError, size_label: &str) -> Self {
        match err.status() {
            StatusCode::PAYLOAD_TOO_LARGE => too_large(size_label),
            _ => AppError::BadRequest(err.body_text()),
        }
    }
}

fn too_large(size_label: &str) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File too large. Maximum allowed size is {}.",
        size_label
    ))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
