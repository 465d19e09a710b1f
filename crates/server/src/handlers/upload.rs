//! # Artifact Upload Handlers
//!
//! Recorded dialogue samples are queued for the next aggregation run. The
//! multipart body carries the media part (`audio` or `video`) and the owner's
//! `userId`.

use super::{read_upload_form, AppError, AppState};
use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use familycare::UploadError;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse {
    pub success: bool,
    pub file_name: String,
}

async fn queue_artifact(
    app_state: AppState,
    multipart: Multipart,
    field: &str,
) -> Result<Json<QueueResponse>, AppError> {
    let form = read_upload_form(multipart, &[field], &["userId"]).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::BadRequest(format!("Missing '{field}' file part.")))?;
    let user_id = form.fields.get("userId").ok_or(UploadError::MissingUserId)?;

    let stored = app_state
        .uploads
        .store(&file.field, file.file_name.as_deref(), Some(user_id), &file.bytes)
        .await?;
    Ok(Json(QueueResponse {
        success: true,
        file_name: stored.file_name,
    }))
}

pub async fn queue_audio(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<QueueResponse>, AppError> {
    queue_artifact(app_state, multipart, "audio").await
}

pub async fn queue_video(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<QueueResponse>, AppError> {
    queue_artifact(app_state, multipart, "video").await
}
