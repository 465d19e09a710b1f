//! # Sentiment Aggregator
//!
//! Turns the pending dialogue recordings into one daily report per account.
//!
//! A run lists the holding area, groups artifacts by account and processes
//! the groups one after another. Inside a group each artifact is transcoded
//! and scored; a failure on one artifact is logged and skipped. After a group
//! is scored its report is committed to the store, and only then are its
//! artifacts moved to the public uploads, so a crash never loses a report
//! for artifacts that were already released.

use crate::{
    artifacts::{ArtifactGroup, PendingArea},
    constants::TRANSCODED_SUFFIX,
    errors::AggregateError,
    providers::analysis::EmotionAnalyzer,
    reports,
    store::Store,
    transcode::Transcoder,
    types::{Account, EmotionScores, Mood, Role, SentimentReport},
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::{fs, sync::Mutex};
use tracing::{info, warn};

/// Trend text for reports built from the analysis backend.
pub const ANALYSIS_TREND: &str = "Voice analysis";

/// Suggestion attached to every generated report.
pub const DEFAULT_SUGGESTION: &str =
    "Consider how their day went and reach out with some care.";

/// Name recorded when an artifact's account no longer exists.
pub const UNKNOWN_USER_NAME: &str = "Family member";

/// The canned summary for a dominant mood.
pub fn summary_for(mood: Mood) -> &'static str {
    match mood {
        Mood::Happiness => "Full of energy, with a positive tone of voice.",
        Mood::Sadness => "Low tone of voice; their mood seems a little down.",
        Mood::Anger => "Agitated and speaking quickly.",
        Mood::Fear => "Tense voice, showing some unease.",
        Mood::Neutral => "Calm and steady; nothing unusual.",
    }
}

/// The running totals of one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupScores {
    pub totals: EmotionScores,
    /// Artifacts that produced a well-formed analysis.
    pub valid: usize,
    /// Artifacts considered, valid or not.
    pub considered: usize,
}

impl GroupScores {
    pub fn add(&mut self, scores: &EmotionScores) {
        self.totals.accumulate(scores);
        self.valid += 1;
    }
}

/// Builds the report for one group from its accumulated scores.
pub fn build_report(
    user_id: &str,
    account: Option<&Account>,
    scores: &GroupScores,
    now: DateTime<Utc>,
) -> SentimentReport {
    let details = scores.totals.rounded_mean(scores.valid);
    let mood = details.dominant();
    SentimentReport {
        id: format!("daily-{user_id}-{}", now.timestamp_millis()),
        user_id: user_id.to_string(),
        user_name: account
            .map(|a| a.name.clone())
            .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string()),
        user_role: account.map(|a| a.role).unwrap_or(Role::Elderly),
        date: now.date_naive(),
        overall_mood: mood,
        trend: ANALYSIS_TREND.to_string(),
        summary: summary_for(mood).to_string(),
        details,
        suggestions: DEFAULT_SUGGESTION.to_string(),
        interaction_count: scores.considered,
    }
}

/// The result of one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The holding area had no artifacts; nothing was written.
    NothingToDo,
    /// One report per processed account, in processing order.
    Completed { reports: Vec<SentimentReport> },
}

impl SyncOutcome {
    pub fn report_count(&self) -> usize {
        match self {
            SyncOutcome::NothingToDo => 0,
            SyncOutcome::Completed { reports } => reports.len(),
        }
    }
}

#[derive(Debug)]
pub struct SentimentAggregator {
    store: Arc<Store>,
    pending: Arc<PendingArea>,
    transcoder: Box<dyn Transcoder>,
    analyzer: Box<dyn EmotionAnalyzer>,
    run_lock: Mutex<()>,
}

impl SentimentAggregator {
    pub fn new(
        store: Arc<Store>,
        pending: Arc<PendingArea>,
        transcoder: Box<dyn Transcoder>,
        analyzer: Box<dyn EmotionAnalyzer>,
    ) -> Self {
        Self {
            store,
            pending,
            transcoder,
            analyzer,
            run_lock: Mutex::new(()),
        }
    }

    /// Processes everything currently pending.
    ///
    /// Only one run may be in flight; a concurrent call fails with
    /// [`AggregateError::AlreadyRunning`]. A directory or store failure aborts
    /// the run, leaving groups committed so far in place.
    pub async fn run(&self) -> Result<SyncOutcome, AggregateError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| AggregateError::AlreadyRunning)?;

        info!(analyzer = self.analyzer.name(), "Sentiment aggregation started.");
        let groups = self.pending.scan().await?;
        if groups.is_empty() {
            info!("No new recordings to analyze.");
            return Ok(SyncOutcome::NothingToDo);
        }

        let db = self.store.snapshot().await?;
        let mut generated = Vec::with_capacity(groups.len());
        for group in groups {
            let account = db.account(&group.user_id);
            info!(
                user_id = %group.user_id,
                artifacts = group.files.len(),
                "Analyzing recordings for {}.",
                account.map(|a| a.name.as_str()).unwrap_or(UNKNOWN_USER_NAME)
            );

            let scores = self.score_group(&group).await;
            let report = build_report(&group.user_id, account, &scores, Utc::now());
            reports::record(&self.store, report.clone()).await?;
            self.pending.release(&group.files).await?;

            info!(
                user_id = %group.user_id,
                valid = scores.valid,
                mood = ?report.overall_mood,
                "Report {} written.",
                report.id
            );
            generated.push(report);
        }

        info!("Sentiment aggregation finished with {} report(s).", generated.len());
        Ok(SyncOutcome::Completed { reports: generated })
    }

    async fn score_group(&self, group: &ArtifactGroup) -> GroupScores {
        let mut scores = GroupScores {
            considered: group.files.len(),
            ..Default::default()
        };
        for file in &group.files {
            match self.score_artifact(file).await {
                Ok(artifact_scores) => scores.add(&artifact_scores),
                Err(e) => warn!("Skipping artifact {file}: {e:#}"),
            }
        }
        scores
    }

    /// Transcodes and scores one artifact. The temporary WAV is always removed.
    async fn score_artifact(&self, file: &str) -> anyhow::Result<EmotionScores> {
        let input = self.pending.dir().join(file);
        let wav = self.pending.dir().join(format!("{file}{TRANSCODED_SUFFIX}"));

        let result = async {
            self.transcoder
                .transcode(&input, &wav)
                .await
                .context("transcoding failed")?;
            self.analyzer
                .analyze(&wav)
                .await
                .context("analysis failed")
        }
        .await;

        if let Err(e) = fs::remove_file(&wav).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temporary file {}: {e}", wav.display());
            }
        }
        result
    }
}
