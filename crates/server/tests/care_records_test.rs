//! # Schedule, Health Log and Message Tests

mod common;

use anyhow::Result;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::{json, Value};

const GRANDMA: &str = "13800000001";
const DAD: &str = "13800000002";

#[tokio::test]
async fn test_schedule_status_toggle_keeps_other_fields() -> Result<()> {
    let app = TestApp::spawn().await?;

    let created: Value = app
        .client
        .post(app.url("/api/schedules"))
        .json(&json!({
            "userId": GRANDMA,
            "title": "Blood pressure pill",
            "time": "08:30",
            "type": "medication",
            "createdBy": DAD,
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(created["status"], "pending");
    let id = created["id"].as_str().unwrap().to_string();

    let mut last = created.clone();
    for status in ["completed", "pending"] {
        let updated: Value = app
            .client
            .patch(app.url(&format!("/api/schedules/{id}")))
            .json(&json!({ "status": status }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        assert_eq!(updated["status"], status);
        for field in ["id", "userId", "title", "time", "type", "createdBy"] {
            assert_eq!(updated[field], created[field], "{field} changed");
        }
        assert_eq!(app.app_state.store.snapshot().await?.schedules.len(), 1);
        last = updated;
    }
    assert_eq!(last, created);

    let listed: Vec<Value> = app
        .client
        .get(app.url(&format!("/api/schedules/{GRANDMA}")))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(listed, vec![last]);
    Ok(())
}

#[tokio::test]
async fn test_schedule_delete_and_missing_update() -> Result<()> {
    let app = TestApp::spawn().await?;
    let created: Value = app
        .client
        .post(app.url("/api/schedules"))
        .json(&json!({
            "userId": GRANDMA,
            "title": "Morning walk",
            "time": "07:00",
            "type": "life",
            "createdBy": GRANDMA,
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let id = created["id"].as_str().unwrap();

    let deleted: Value = app
        .client
        .delete(app.url(&format!("/api/schedules/{id}")))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(deleted, json!({ "success": true }));
    assert!(app.app_state.store.snapshot().await?.schedules.is_empty());

    let response = app
        .client
        .patch(app.url(&format!("/api/schedules/{id}")))
        .json(&json!({ "status": "completed" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_schedule_requires_title() -> Result<()> {
    let app = TestApp::spawn().await?;
    let response = app
        .client
        .post(app.url("/api/schedules"))
        .json(&json!({
            "userId": GRANDMA,
            "title": " ",
            "time": "07:00",
            "type": "life",
            "createdBy": GRANDMA,
        }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "title is required");
    Ok(())
}

#[tokio::test]
async fn test_health_logs_are_listed_per_phone() -> Result<()> {
    let app = TestApp::spawn().await?;
    for (phone, value) in [(GRANDMA, "120/80"), (DAD, "118/76")] {
        app.client
            .post(app.url("/api/health-logs"))
            .json(&json!({ "userId": phone, "type": "blood_pressure", "value": value }))
            .send()
            .await?
            .error_for_status()?;
    }

    let logs: Vec<Value> = app
        .client
        .get(app.url(&format!("/api/health-logs/{GRANDMA}")))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["value"], "120/80");
    assert_eq!(logs[0]["type"], "blood_pressure");
    assert!(logs[0]["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_messages_are_delivered_once() -> Result<()> {
    let app = TestApp::spawn().await?;
    let sent: Value = app
        .client
        .post(app.url("/api/messages"))
        .json(&json!({
            "fromUserId": "dad-id",
            "targetPhone": GRANDMA,
            "content": "Remember your umbrella",
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(sent["status"], "pending");
    assert_eq!(sent["type"], "text");

    let pending_url = app.url(&format!("/api/messages/{GRANDMA}"));
    let pending: Vec<Value> = app.client.get(&pending_url).send().await?.json().await?;
    assert_eq!(pending, vec![sent.clone()]);

    let delivered: Value = app
        .client
        .put(app.url(&format!("/api/messages/{}/status", sent["id"].as_str().unwrap())))
        .json(&json!({ "status": "delivered" }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(delivered["status"], "delivered");

    let pending: Vec<Value> = app.client.get(&pending_url).send().await?.json().await?;
    assert!(pending.is_empty());

    let missing = app
        .client
        .put(app.url("/api/messages/nope/status"))
        .json(&json!({ "status": "delivered" }))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    Ok(())
}
