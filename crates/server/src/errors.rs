use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use familycare::{AggregateError, StoreError, UploadError};
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// Each variant wraps the error of one library concern so it can be mapped
/// to a status code in a single place.
pub enum AppError {
    /// Errors from the record store and the operations on it.
    Store(StoreError),
    /// Errors from writing an uploaded file.
    Upload(UploadError),
    /// Errors that aborted an aggregation run.
    Aggregate(AggregateError),
    /// A malformed request the extractors could not catch (e.g. a bad multipart body).
    BadRequest(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::Upload(err)
    }
}

impl From<AggregateError> for AppError {
    fn from(err: AggregateError) -> Self {
        AppError::Aggregate(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

const INTERNAL_MESSAGE: &str = "An internal server error occurred.";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Store(err) => match err {
                StoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
                StoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
                StoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                StoreError::Conflict(msg) => (StatusCode::CONFLICT, msg),
                StoreError::Io(_) | StoreError::Json(_) => {
                    error!("StoreError: {:?}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
            AppError::Upload(err) => match err {
                UploadError::MissingUserId | UploadError::InvalidUserId(_) => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                UploadError::Io(_) | UploadError::Manifest(_) => {
                    error!("UploadError: {:?}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
            AppError::Aggregate(err) => match err {
                AggregateError::AlreadyRunning => (StatusCode::CONFLICT, err.to_string()),
                other => {
                    error!("Aggregation failed: {:?}", other);
                    (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
                }
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
