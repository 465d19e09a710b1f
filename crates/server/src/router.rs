use super::{handlers, state::AppState};
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Router,
};
use familycare::constants::{PENDING_DIR_NAME, UPLOADS_URL_PREFIX};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(app_state.config.uploads.max_body_bytes);

    let public_uploads: Router = Router::new()
        .fallback_service(ServeDir::new(&app_state.config.uploads_dir))
        .layer(middleware::from_fn(hide_pending_artifacts));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/api/did/config", get(handlers::avatar_config))
        .route("/api/admin/midnight-sync", post(handlers::midnight_sync))
        .route("/api/login", post(handlers::login))
        .route("/api/register", post(handlers::register))
        .route("/api/users/batch", post(handlers::users_batch))
        .route("/api/users/{id}", patch(handlers::update_profile))
        .route(
            "/api/users/{id}/image",
            post(handlers::upload_image).layer(upload_limit),
        )
        .route(
            "/api/users/{id}/voice",
            post(handlers::upload_voice).layer(upload_limit),
        )
        .route("/api/bind-family", post(handlers::bind_family))
        .route("/api/unbind-family", post(handlers::unbind_family))
        .route("/api/reports", get(handlers::list_reports))
        .route(
            "/api/queue-audio",
            post(handlers::queue_audio).layer(upload_limit),
        )
        .route(
            "/api/queue-video",
            post(handlers::queue_video).layer(upload_limit),
        )
        .route("/api/health-logs", post(handlers::create_health_log))
        .route("/api/health-logs/{phone}", get(handlers::list_health_logs))
        .route("/api/schedules", post(handlers::create_schedule))
        .route(
            "/api/schedules/{id}",
            get(handlers::list_schedules)
                .patch(handlers::update_schedule)
                .delete(handlers::delete_schedule),
        )
        .route("/api/messages", post(handlers::send_message))
        .route("/api/messages/{id}", get(handlers::pending_messages))
        .route(
            "/api/messages/{id}/status",
            put(handlers::set_message_status),
        )
        .nest_service(UPLOADS_URL_PREFIX, public_uploads)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Keeps the holding area out of the static uploads.
///
/// Generated upload names never need percent-encoding, so encoded paths are
/// refused outright rather than decoded and checked.
async fn hide_pending_artifacts(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if path.contains('%') || path.split('/').any(|segment| segment == PENDING_DIR_NAME) {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}
