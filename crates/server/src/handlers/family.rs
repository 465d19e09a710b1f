use super::{AppError, AppState};
use axum::{extract::State, Json};
use familycare::{
    family::{self, BindRequest},
    types::AccountView,
};

pub async fn bind_family(
    State(app_state): State<AppState>,
    Json(request): Json<BindRequest>,
) -> Result<Json<AccountView>, AppError> {
    Ok(Json(family::bind(&app_state.store, request).await?))
}

pub async fn unbind_family(
    State(app_state): State<AppState>,
    Json(request): Json<BindRequest>,
) -> Result<Json<AccountView>, AppError> {
    Ok(Json(family::unbind(&app_state.store, request).await?))
}
