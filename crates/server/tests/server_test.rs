//! # General Server Tests
//!
//! The banner, health check, avatar credentials, static uploads and the
//! handling of malformed requests.

mod common;

use anyhow::Result;
use common::TestApp;
use familycare::constants::PENDING_DIR_NAME;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_root_and_health_check() -> Result<()> {
    let app = TestApp::spawn().await?;

    let root = app.client.get(app.url("/")).send().await?;
    assert_eq!(root.status(), StatusCode::OK);
    assert_eq!(root.text().await?, "familycare server is running.");

    let health = app.client.get(app.url("/health")).send().await?;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn test_avatar_config_returns_client_credentials() -> Result<()> {
    let app = TestApp::spawn().await?;

    let body: Value = app
        .client
        .get(app.url("/api/did/config"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    assert_eq!(
        body,
        json!({ "clientKey": "test-client-key", "agentId": "agent-123" })
    );
    Ok(())
}

#[tokio::test]
async fn test_public_uploads_are_served() -> Result<()> {
    let app = TestApp::spawn().await?;
    tokio::fs::write(app.uploads_dir().join("image-1-2.png"), b"png-bytes").await?;

    let response = app.client.get(app.url("/uploads/image-1-2.png")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await?.as_ref(), b"png-bytes");
    Ok(())
}

#[tokio::test]
async fn test_holding_area_is_not_served() -> Result<()> {
    let app = TestApp::spawn().await?;
    let pending = app.uploads_dir().join(PENDING_DIR_NAME);
    tokio::fs::write(pending.join("video-42-1001.webm"), b"private").await?;

    for path in [
        format!("/uploads/{PENDING_DIR_NAME}/video-42-1001.webm"),
        format!("/uploads/{PENDING_DIR_NAME}/manifest.json"),
        "/uploads/pending%5Fanalysis/video-42-1001.webm".to_string(),
    ] {
        let response = app.client.get(app.url(&path)).send().await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
    }
    Ok(())
}

#[tokio::test]
async fn test_malformed_json_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .post(app.url("/api/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert!(response.status().is_client_error());

    let response = app
        .client
        .post(app.url("/api/register"))
        .json(&json!({ "phone": "1", "name": "A", "password": "p", "role": "parent", "admin": true }))
        .send()
        .await?;
    assert!(response.status().is_client_error());
    Ok(())
}
