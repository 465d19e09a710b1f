//! # Common Test Utilities
//!
//! `TestApp` spawns the real router on a random port, backed by a temporary
//! data file and uploads tree. Analysis goes to a `MockAnalyzer` the test can
//! queue results on, and transcoding is a plain copy.

// Not every test binary uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use familycare_server::{
    config,
    router,
    state::{build_app_state_with, AppState},
};
use familycare_test_utils::{CopyTranscoder, MockAnalyzer};
use reqwest::{multipart, Client};
use serde_json::{json, Value};
use std::{fs::File, io::Write, net::SocketAddr, path::PathBuf};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub analyzer: MockAnalyzer,
    pub app_state: AppState,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server and returns a `TestApp` instance.
    pub async fn spawn() -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let config_dir = tempdir()?;
        let config_path = config_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
db_file: "{}"
uploads_dir: "{}"
avatar:
  client_key: "test-client-key"
  agent_id: "agent-123"
"#,
            config_dir.path().join("db.json").display(),
            config_dir.path().join("uploads").display(),
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(Some(config_path.to_str().unwrap()))?;
        let analyzer = MockAnalyzer::new();
        let app_state = build_app_state_with(
            config,
            Box::new(CopyTranscoder),
            Box::new(analyzer.clone()),
        )
        .await?;
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            analyzer,
            app_state: app_state_for_harness,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.app_state.config.uploads_dir)
    }

    /// Registers an account over HTTP and returns the response body.
    pub async fn register(&self, phone: &str, name: &str, role: &str) -> Result<Value> {
        let response = self
            .client
            .post(self.url("/api/register"))
            .json(&json!({
                "phone": phone,
                "name": name,
                "password": "secret",
                "role": role,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Queues a recording for `user_id` and returns the generated file name.
    pub async fn queue_video(&self, user_id: &str, bytes: &[u8]) -> Result<String> {
        let form = multipart::Form::new().text("userId", user_id.to_string()).part(
            "video",
            multipart::Part::bytes(bytes.to_vec()).file_name("clip.webm"),
        );
        let body: Value = self
            .client
            .post(self.url("/api/queue-video"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body["fileName"].as_str().unwrap_or_default().to_string())
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
