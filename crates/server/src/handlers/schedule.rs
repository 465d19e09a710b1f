//! # Schedule Handlers
//!
//! `GET`, `PATCH` and `DELETE` share the `/api/schedules/{id}` route. For the
//! `GET` the path segment is the owner's phone, for the others the item id.

use super::{AppError, AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use familycare::{
    schedules::{self, NewSchedule, ScheduleUpdate},
    types::ScheduleItem,
};
use serde_json::{json, Value};

pub async fn list_schedules(
    State(app_state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<Vec<ScheduleItem>>, AppError> {
    Ok(Json(schedules::list(&app_state.store, &phone).await?))
}

pub async fn create_schedule(
    State(app_state): State<AppState>,
    Json(new): Json<NewSchedule>,
) -> Result<Json<ScheduleItem>, AppError> {
    Ok(Json(schedules::create(&app_state.store, new).await?))
}

pub async fn update_schedule(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ScheduleUpdate>,
) -> Result<Json<ScheduleItem>, AppError> {
    Ok(Json(schedules::update(&app_state.store, &id, update).await?))
}

pub async fn delete_schedule(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    schedules::delete(&app_state.store, &id).await?;
    Ok(Json(json!({ "success": true })))
}
