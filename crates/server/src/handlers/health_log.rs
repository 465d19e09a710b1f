use super::{AppError, AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use familycare::{
    health::{self, NewHealthLog},
    types::HealthLog,
};

pub async fn create_health_log(
    State(app_state): State<AppState>,
    Json(new): Json<NewHealthLog>,
) -> Result<Json<HealthLog>, AppError> {
    Ok(Json(health::create(&app_state.store, new).await?))
}

pub async fn list_health_logs(
    State(app_state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<Vec<HealthLog>>, AppError> {
    Ok(Json(health::list(&app_state.store, &phone).await?))
}
