//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup: the record store, the uploads tree and the
//! sentiment aggregator with its configured transcoder and analysis backend.

use crate::config::AppConfig;
use familycare::{
    artifacts::PendingArea,
    providers::{analysis::EmotionAnalyzer, factory::create_analyzer},
    store::Store,
    transcode::{FfmpegTranscoder, Transcoder},
    SentimentAggregator, UploadRouter,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The JSON document store.
    pub store: Arc<Store>,
    /// The holding area for analysis artifacts.
    pub pending: Arc<PendingArea>,
    /// Writes uploads into the public directory or the holding area.
    pub uploads: Arc<UploadRouter>,
    /// Turns pending artifacts into daily reports.
    pub aggregator: Arc<SentimentAggregator>,
}

/// Builds the shared application state from the configuration, using the
/// configured `ffmpeg` program and analysis backend.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let transcoder = FfmpegTranscoder::new(
        config.transcoder.program.clone(),
        config.transcoder.sample_rate,
        config.transcoder.channels,
        Duration::from_secs(config.transcoder.timeout_secs),
    );
    let analyzer = create_analyzer(&config.analysis)?;
    build_app_state_with(config, Box::new(transcoder), analyzer).await
}

/// Builds the state around an explicit transcoder and analyzer.
pub async fn build_app_state_with(
    config: AppConfig,
    transcoder: Box<dyn Transcoder>,
    analyzer: Box<dyn EmotionAnalyzer>,
) -> anyhow::Result<AppState> {
    let store = Arc::new(Store::json_file(&config.db_file));
    info!(db_file = %config.db_file, backend = store.backend_name(), "Initialized record store.");

    let pending = Arc::new(PendingArea::new(&config.uploads_dir));
    pending.ensure_dirs().await?;
    info!(uploads_dir = %config.uploads_dir, "Uploads directories are ready.");

    let uploads = Arc::new(UploadRouter::new(pending.clone()));
    let aggregator = Arc::new(SentimentAggregator::new(
        store.clone(),
        pending.clone(),
        transcoder,
        analyzer,
    ));

    Ok(AppState {
        config: Arc::new(config),
        store,
        pending,
        uploads,
        aggregator,
    })
}
