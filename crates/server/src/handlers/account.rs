//! # Account Handlers
//!
//! Login, registration, profile updates and the avatar/voice sample uploads.

use super::{read_upload_form, AppError, AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Multipart;
use familycare::{
    accounts::{self, Credentials, ProfileUpdate, Registration},
    types::{AccountSummary, AccountView},
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhoneList {
    pub phones: Vec<String>,
}

pub async fn login(
    State(app_state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AccountView>, AppError> {
    let account = accounts::login(&app_state.store, &credentials).await?;
    info!(user_id = %account.id, "User logged in.");
    Ok(Json(account))
}

pub async fn register(
    State(app_state): State<AppState>,
    Json(registration): Json<Registration>,
) -> Result<Json<AccountView>, AppError> {
    Ok(Json(accounts::register(&app_state.store, registration).await?))
}

pub async fn update_profile(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<AccountView>, AppError> {
    Ok(Json(accounts::update_profile(&app_state.store, &id, update).await?))
}

/// Looks up the bound family members of a client by phone.
pub async fn users_batch(
    State(app_state): State<AppState>,
    Json(payload): Json<PhoneList>,
) -> Result<Json<Vec<AccountSummary>>, AppError> {
    Ok(Json(
        accounts::accounts_by_phones(&app_state.store, &payload.phones).await?,
    ))
}

/// Which profile sample an upload replaces.
#[derive(Clone, Copy)]
enum SampleKind {
    Image,
    Voice,
}

impl SampleKind {
    fn field(self) -> &'static str {
        match self {
            SampleKind::Image => "image",
            SampleKind::Voice => "voice",
        }
    }
}

async fn upload_sample(
    app_state: AppState,
    id: String,
    multipart: Multipart,
    kind: SampleKind,
) -> Result<Json<AccountView>, AppError> {
    let field = kind.field();
    let form = read_upload_form(multipart, &[field], &[]).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::BadRequest(format!("Missing '{field}' file part.")))?;

    let stored = app_state
        .uploads
        .store(&file.field, file.file_name.as_deref(), None, &file.bytes)
        .await?;

    let result = match kind {
        SampleKind::Image => accounts::set_avatar_image(&app_state.store, &id, &stored.url).await,
        SampleKind::Voice => accounts::set_voice_sample(&app_state.store, &id, &stored.url).await,
    };
    match result {
        Ok(view) => Ok(Json(view)),
        Err(err) => {
            // The sample belongs to no one; do not leave it in the public tree.
            if let Err(e) = app_state.uploads.discard(&stored).await {
                warn!("Failed to remove orphaned upload {}: {e}", stored.file_name);
            }
            Err(err.into())
        }
    }
}

pub async fn upload_image(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<AccountView>, AppError> {
    upload_sample(app_state, id, multipart, SampleKind::Image).await
}

pub async fn upload_voice(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<AccountView>, AppError> {
    upload_sample(app_state, id, multipart, SampleKind::Voice).await
}
