//! # Aggregation Trigger
//!
//! The admin endpoint that runs the sentiment aggregator on demand. The same
//! run is started by the nightly scheduler when it is enabled.

use super::{AppError, AppState};
use axum::{extract::State, Json};
use familycare::SyncOutcome;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn midnight_sync(
    State(app_state): State<AppState>,
) -> Result<Json<SyncResponse>, AppError> {
    info!("Midnight sync triggered over HTTP.");
    let outcome = app_state.aggregator.run().await?;
    let message = match &outcome {
        SyncOutcome::NothingToDo => Some("No new recordings to analyze".to_string()),
        SyncOutcome::Completed { .. } => None,
    };
    Ok(Json(SyncResponse {
        success: true,
        count: outcome.report_count(),
        message,
    }))
}
