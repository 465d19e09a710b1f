//! # Midnight Sync Tests
//!
//! Runs the aggregator through the admin endpoint and reads the reports back.

mod common;

use anyhow::Result;
use common::TestApp;
use familycare::{constants::PENDING_DIR_NAME, types::EmotionScores};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn midnight_sync(app: &TestApp) -> Result<Value> {
    Ok(app
        .client
        .post(app.url("/api/admin/midnight-sync"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?)
}

#[tokio::test]
async fn test_sync_with_nothing_queued_is_a_no_op() -> Result<()> {
    let app = TestApp::spawn().await?;

    let body = midnight_sync(&app).await?;
    assert_eq!(
        body,
        json!({ "success": true, "count": 0, "message": "No new recordings to analyze" })
    );
    assert!(app.app_state.store.snapshot().await?.reports.is_empty());
    assert!(app.analyzer.get_calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_sync_averages_recordings_into_one_report() -> Result<()> {
    let app = TestApp::spawn().await?;
    let grandma = app.register("13800000001", "Grandma", "elderly").await?;
    let id = grandma["id"].as_str().unwrap();

    let first = app.queue_video(id, b"one").await?;
    let second = app.queue_video(id, b"two").await?;
    app.analyzer
        .push_scores(EmotionScores::new(80.0, 10.0, 0.0, 0.0))
        .push_scores(EmotionScores::new(60.0, 20.0, 0.0, 0.0));

    let body = midnight_sync(&app).await?;
    assert_eq!(body, json!({ "success": true, "count": 1 }));
    assert_eq!(app.analyzer.get_calls().len(), 2);

    let reports: Vec<Value> = app
        .client
        .get(app.url(&format!("/api/reports?userIds={id}")))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report["userId"], id);
    assert_eq!(report["userName"], "Grandma");
    assert_eq!(report["userRole"], "elderly");
    assert_eq!(report["overallMood"], "happiness");
    assert_eq!(report["details"]["happiness"], 70.0);
    assert_eq!(report["details"]["sadness"], 15.0);
    assert_eq!(report["interactionCount"], 2);

    // Processed recordings leave the holding area and become public.
    let pending = app.uploads_dir().join(PENDING_DIR_NAME);
    for file in [&first, &second] {
        assert!(!pending.join(file).exists());
        let served = app.client.get(app.url(&format!("/uploads/{file}"))).send().await?;
        assert_eq!(served.status(), StatusCode::OK);
    }

    // A second run finds nothing left to do.
    let body = midnight_sync(&app).await?;
    assert_eq!(body["count"], 0);
    assert_eq!(app.app_state.store.snapshot().await?.reports.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_analysis_yields_neutral_report() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.queue_video("42", b"garbled").await?;
    app.analyzer.push_failure();

    let body = midnight_sync(&app).await?;
    assert_eq!(body["count"], 1);

    let db = app.app_state.store.snapshot().await?;
    let report = &db.reports[0];
    assert_eq!(report.user_id, "42");
    assert_eq!(report.user_name, "Family member");
    assert_eq!(report.details, EmotionScores::default());
    assert_eq!(report.interaction_count, 1);
    assert_eq!(
        serde_json::to_value(report.overall_mood)?,
        json!("neutral")
    );
    Ok(())
}

#[tokio::test]
async fn test_reports_filter_by_user_ids() -> Result<()> {
    let app = TestApp::spawn().await?;
    for user in ["7", "8", "9"] {
        app.queue_video(user, b"clip").await?;
        app.analyzer.push_scores(EmotionScores::new(0.0, 50.0, 0.0, 0.0));
    }
    assert_eq!(midnight_sync(&app).await?["count"], 3);

    let filtered: Vec<Value> = app
        .client
        .get(app.url("/api/reports?userIds=7&userIds=9"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let mut users: Vec<&str> = filtered.iter().filter_map(|r| r["userId"].as_str()).collect();
    users.sort();
    assert_eq!(users, vec!["7", "9"]);

    let all: Vec<Value> = app
        .client
        .get(app.url("/api/reports"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|r| r["overallMood"] == "sadness"));
    Ok(())
}
