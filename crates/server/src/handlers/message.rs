//! # Message Handlers
//!
//! Care messages are queued by a parent and picked up by the recipient's
//! avatar session, which marks them delivered.

use super::{AppError, AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use familycare::{
    messages::{self, NewMessage, StatusUpdate},
    types::Message,
};
use tracing::info;

pub async fn send_message(
    State(app_state): State<AppState>,
    Json(new): Json<NewMessage>,
) -> Result<Json<Message>, AppError> {
    let message = messages::send(&app_state.store, new).await?;
    info!(message_id = %message.id, "Queued message for {}.", message.target_phone);
    Ok(Json(message))
}

/// Undelivered messages for the phone in the path.
pub async fn pending_messages(
    State(app_state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<Vec<Message>>, AppError> {
    Ok(Json(messages::pending_for(&app_state.store, &phone).await?))
}

pub async fn set_message_status(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Message>, AppError> {
    Ok(Json(
        messages::set_status(&app_state.store, &id, update.status).await?,
    ))
}
