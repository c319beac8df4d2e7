use crate::AppState;
use crate::api::error::AppError;
use crate::utils::validation::{FALLBACK_FILENAME, sanitize_filename};
use axum::{
    Json,
    extract::{Multipart, State},
};
use futures::TryStreamExt;
use serde::Serialize;
use std::io;
use tokio_util::io::StreamReader;
use tracing::info;
use utoipa::ToSchema;

/// Name of the multipart field carrying the video
pub const FILE_FIELD: &str = "file";

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    /// Stored file name
    pub filename: String,
    /// Size of the uploaded file in bytes
    pub size_bytes: u64,
    /// Informational message about the upload result
    pub message: String,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// Video file to upload
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data", description = "Video file to upload"),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadResponse),
        (status = 400, description = "Validation error", body = crate::api::error::ErrorResponse),
        (status = 413, description = "Payload too large", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Server/storage error", body = crate::api::error::ErrorResponse)
    ),
    tag = "upload"
)]
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let size_label = state.config.max_size_label();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::from_multipart(&e, &size_label))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_filename = field
            .file_name()
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_FILENAME)
            .to_string();
        let filename = sanitize_filename(&original_filename);

        // Waits for a free slot instead of rejecting
        let _permit = state
            .upload_slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::Internal("Upload slots are closed".to_string()))?;

        let body_with_io_error = field.map_err(io::Error::other);
        let reader = StreamReader::new(body_with_io_error);

        let stored = state
            .storage
            .store_stream(&filename, Box::new(reader), state.config.max_file_size)
            .await
            .map_err(|e| AppError::from_storage(e, &size_label))?;

        info!(
            "💾 Stored {} as {} ({} bytes)",
            original_filename, stored.filename, stored.size_bytes
        );

        return Ok(Json(UploadResponse {
            filename: stored.filename,
            size_bytes: stored.size_bytes,
            message: "Upload successful".to_string(),
        }));
    }

    Err(AppError::BadRequest("No file provided".to_string()))
}
