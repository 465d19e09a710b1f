//! # Sentiment Aggregator Tests
//!
//! Runs the aggregator end to end over a temporary uploads tree, with the
//! transcoder and analyzer replaced by test doubles.

use async_trait::async_trait;
use familycare::{
    aggregator::{summary_for, SentimentAggregator, SyncOutcome, UNKNOWN_USER_NAME},
    constants::TRANSCODED_SUFFIX,
    errors::{AggregateError, TranscodeError},
    reports,
    store::Store,
    transcode::Transcoder,
    types::{Database, EmotionScores, Mood, Role},
};
use familycare_test_utils::{
    account, CopyTranscoder, FailingTranscoder, FlakyStorage, MockAnalyzer, TestWorkspace,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn aggregator(
    ws: &TestWorkspace,
    transcoder: Box<dyn Transcoder>,
    analyzer: &MockAnalyzer,
) -> SentimentAggregator {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    SentimentAggregator::new(
        ws.store.clone(),
        ws.pending.clone(),
        transcoder,
        Box::new(analyzer.clone()),
    )
}

fn leftover_temp_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(TRANSCODED_SUFFIX))
        .count()
}

#[tokio::test]
async fn test_scores_are_averaged_per_user() -> anyhow::Result<()> {
    // --- 1. Arrange ---
    let ws = TestWorkspace::new().await?;
    ws.seed_account(account("u1", "111", "Grandma", Role::Elderly)).await?;
    ws.write_pending("video-u1-1000-1.webm", b"first").await?;
    ws.write_pending("video-u1-1001-2.webm", b"second").await?;

    let analyzer = MockAnalyzer::new();
    analyzer
        .push_scores(EmotionScores::new(80.0, 10.0, 0.0, 0.0))
        .push_scores(EmotionScores::new(60.0, 30.0, 0.0, 0.0));

    // --- 2. Act ---
    let outcome = aggregator(&ws, Box::new(CopyTranscoder), &analyzer)
        .run()
        .await?;

    // --- 3. Assert ---
    let SyncOutcome::Completed { reports: generated } = outcome else {
        panic!("expected reports to be generated");
    };
    assert_eq!(generated.len(), 1);
    let report = &generated[0];
    assert_eq!(report.details, EmotionScores::new(70.0, 20.0, 0.0, 0.0));
    assert_eq!(report.overall_mood, Mood::Happiness);
    assert_eq!(report.summary, summary_for(Mood::Happiness));
    assert_eq!(report.user_name, "Grandma");
    assert_eq!(report.interaction_count, 2);
    assert!(report.id.starts_with("daily-u1-"));

    // Each artifact was analyzed from its own transcoded copy.
    let calls = analyzer.get_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].to_string_lossy().ends_with(TRANSCODED_SUFFIX));

    // The report is persisted and the artifacts are public now.
    let stored = reports::list(&ws.store, &["u1".to_string()]).await?;
    assert_eq!(stored, generated);
    assert!(ws.uploads_dir().join("video-u1-1000-1.webm").exists());
    assert!(ws.uploads_dir().join("video-u1-1001-2.webm").exists());
    assert!(ws.pending.scan().await?.is_empty());
    assert_eq!(leftover_temp_files(ws.pending.dir()), 0);
    Ok(())
}

#[tokio::test]
async fn test_failed_artifacts_yield_a_neutral_report() -> anyhow::Result<()> {
    let ws = TestWorkspace::new().await?;
    ws.write_pending("audio-u9-1000-1.webm", b"broken").await?;
    ws.write_pending("audio-u9-1001-2.webm", b"broken").await?;
    let analyzer = MockAnalyzer::new();

    let outcome = aggregator(&ws, Box::new(FailingTranscoder), &analyzer)
        .run()
        .await?;

    let SyncOutcome::Completed { reports: generated } = outcome else {
        panic!("expected reports to be generated");
    };
    let report = &generated[0];
    assert_eq!(report.details, EmotionScores::default());
    assert_eq!(report.overall_mood, Mood::Neutral);
    assert_eq!(report.interaction_count, 2);
    assert_eq!(report.user_name, UNKNOWN_USER_NAME);
    assert_eq!(report.user_role, Role::Elderly);

    // The analyzer never ran and the partial outputs were cleaned up.
    assert!(analyzer.get_calls().is_empty());
    assert_eq!(leftover_temp_files(ws.pending.dir()), 0);
    assert!(ws.uploads_dir().join("audio-u9-1000-1.webm").exists());
    Ok(())
}

#[tokio::test]
async fn test_mean_only_counts_valid_samples() -> anyhow::Result<()> {
    let ws = TestWorkspace::new().await?;
    ws.write_pending("audio-u1-1000-1.webm", b"a").await?;
    ws.write_pending("audio-u1-1001-2.webm", b"b").await?;
    let analyzer = MockAnalyzer::new();
    analyzer
        .push_failure()
        .push_scores(EmotionScores::new(0.0, 0.0, 41.0, 40.0));

    let outcome = aggregator(&ws, Box::new(CopyTranscoder), &analyzer)
        .run()
        .await?;

    let SyncOutcome::Completed { reports: generated } = outcome else {
        panic!("expected reports to be generated");
    };
    assert_eq!(generated[0].details, EmotionScores::new(0.0, 0.0, 41.0, 40.0));
    assert_eq!(generated[0].overall_mood, Mood::Anger);
    assert_eq!(generated[0].interaction_count, 2);
    Ok(())
}

#[tokio::test]
async fn test_one_report_per_user() -> anyhow::Result<()> {
    let ws = TestWorkspace::new().await?;
    ws.seed_account(account("a", "111", "Grandpa", Role::Elderly)).await?;
    ws.seed_account(account("b", "222", "Grandma", Role::Elderly)).await?;
    ws.write_pending("audio-a-1000-1.webm", b"a").await?;
    ws.write_pending("audio-b-1000-1.webm", b"b").await?;
    let analyzer = MockAnalyzer::new();
    analyzer
        .push_scores(EmotionScores::new(10.0, 90.0, 0.0, 0.0))
        .push_scores(EmotionScores::new(0.0, 0.0, 0.0, 55.0));

    let outcome = aggregator(&ws, Box::new(CopyTranscoder), &analyzer)
        .run()
        .await?;
    assert_eq!(outcome.report_count(), 2);

    // Reports are prepended, so the last processed user comes first.
    let all = reports::list(&ws.store, &[]).await?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].user_id, "b");
    assert_eq!(all[0].overall_mood, Mood::Fear);
    assert_eq!(all[1].user_id, "a");
    assert_eq!(all[1].overall_mood, Mood::Sadness);
    Ok(())
}

#[tokio::test]
async fn test_empty_holding_area_is_a_no_op() -> anyhow::Result<()> {
    let ws = TestWorkspace::new().await?;
    let analyzer = MockAnalyzer::new();

    let outcome = aggregator(&ws, Box::new(CopyTranscoder), &analyzer)
        .run()
        .await?;

    assert_eq!(outcome, SyncOutcome::NothingToDo);
    assert!(reports::list(&ws.store, &[]).await?.is_empty());
    assert!(!ws.db_path().exists());
    Ok(())
}

/// Holds every transcode for a while so a second run can overlap the first.
#[derive(Clone, Debug)]
struct SlowTranscoder;

#[async_trait]
impl Transcoder for SlowTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

#[tokio::test]
async fn test_overlapping_runs_are_rejected() -> anyhow::Result<()> {
    let ws = TestWorkspace::new().await?;
    ws.write_pending("audio-u1-1000-1.webm", b"a").await?;
    let analyzer = MockAnalyzer::new();
    analyzer.push_scores(EmotionScores::new(50.0, 0.0, 0.0, 0.0));
    let aggregator = Arc::new(aggregator(&ws, Box::new(SlowTranscoder), &analyzer));

    let first = tokio::spawn({
        let aggregator = aggregator.clone();
        async move { aggregator.run().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = aggregator.run().await;
    assert!(matches!(second, Err(AggregateError::AlreadyRunning)));

    let first = first.await??;
    assert_eq!(first.report_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_store_failure_aborts_but_keeps_committed_groups() -> anyhow::Result<()> {
    // --- 1. Arrange ---
    let ws = TestWorkspace::new().await?;
    ws.write_pending("audio-a-1000-1.webm", b"a").await?;
    ws.write_pending("audio-b-1000-1.webm", b"b").await?;

    let db = Database {
        users: vec![
            account("a", "111", "Grandpa", Role::Elderly),
            account("b", "222", "Grandma", Role::Elderly),
        ],
        ..Default::default()
    };
    // Only the first group's report can be written.
    let store = Arc::new(Store::new(Box::new(FlakyStorage::new(db, 1))));

    let analyzer = MockAnalyzer::new();
    analyzer
        .push_scores(EmotionScores::new(60.0, 0.0, 0.0, 0.0))
        .push_scores(EmotionScores::new(0.0, 60.0, 0.0, 0.0));
    let aggregator = SentimentAggregator::new(
        store.clone(),
        ws.pending.clone(),
        Box::new(CopyTranscoder),
        Box::new(analyzer.clone()),
    );

    // --- 2. Act ---
    let result = aggregator.run().await;

    // --- 3. Assert ---
    assert!(matches!(result, Err(AggregateError::Store(_))));

    let committed = reports::list(&store, &[]).await?;
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].user_id, "a");

    assert!(ws.uploads_dir().join("audio-a-1000-1.webm").exists());
    assert!(!ws.pending.dir().join("audio-a-1000-1.webm").exists());
    assert!(ws.pending.dir().join("audio-b-1000-1.webm").exists());
    assert!(!ws.uploads_dir().join("audio-b-1000-1.webm").exists());
    assert_eq!(leftover_temp_files(ws.pending.dir()), 0);
    Ok(())
}
