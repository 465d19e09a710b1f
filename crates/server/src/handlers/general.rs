//! # General Route Handlers
//!
//! The root banner, the health check and the avatar SDK credentials.

use super::AppState;
use axum::{extract::State, Json};
use familycare::avatar::AvatarClientConfig;

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "familycare server is running."
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Returns the public credentials the browser needs to start an avatar session.
pub async fn avatar_config(State(app_state): State<AppState>) -> Json<AvatarClientConfig> {
    let avatar = &app_state.config.avatar;
    Json(AvatarClientConfig {
        client_key: avatar.client_key.clone(),
        agent_id: avatar.agent_id.clone(),
    })
}
