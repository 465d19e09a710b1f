use super::{AppError, AppState};
use axum::{extract::State, Json};
use axum_extra::extract::Query;
use familycare::{reports, types::SentimentReport};
use serde::Deserialize;

/// `?userIds=a&userIds=b`; no ids means every report.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default, rename = "userIds")]
    pub user_ids: Vec<String>,
}

pub async fn list_reports(
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<SentimentReport>>, AppError> {
    Ok(Json(reports::list(&app_state.store, &query.user_ids).await?))
}
