//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `familycare-server`.
//! The handlers are split into sub-modules by the records they work on.

pub mod account;
pub mod family;
pub mod general;
pub mod health_log;
pub mod message;
pub mod report;
pub mod schedule;
pub mod sync;
pub mod upload;

// Re-export all handlers from the sub-modules to make them easily accessible
// to the router under a single `handlers::` path.
pub use account::*;
pub use family::*;
pub use general::*;
pub use health_log::*;
pub use message::*;
pub use report::*;
pub use schedule::*;
pub use sync::*;
pub use upload::*;

// Shared items used by multiple handler modules.
use super::{errors::AppError, state::AppState};
use axum_extra::extract::Multipart;
use std::collections::HashMap;
use tracing::warn;

/// The one file part of a multipart upload.
pub(crate) struct UploadedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// A parsed multipart body: at most one file plus any plain text fields.
#[derive(Default)]
pub(crate) struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

/// Reads the whole multipart body. Parts named in `file_fields` are kept as
/// the uploaded file; `text_fields` are read as text; anything else is skipped.
pub(crate) async fn read_upload_form(
    mut multipart: Multipart,
    file_fields: &[&str],
    text_fields: &[&str],
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if file_fields.contains(&name.as_str()) {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.file = Some(UploadedFile {
                field: name,
                file_name,
                bytes: bytes.to_vec(),
            });
        } else if text_fields.contains(&name.as_str()) {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.fields.insert(name, value);
        } else {
            warn!("Ignoring unknown multipart field: {}", name);
        }
    }
    Ok(form)
}
