#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde_json::Value;
use students_api::config::AppConfig;
use students_api::database::SqliteStorage;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One server per test: its own port and its own database file
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: Client,
    pub storage: SqliteStorage,
    _dir: TempDir,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn after letting the test adjust the parsed config
    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let dir = tempfile::tempdir().context("failed to create temp dir")?;

        let yaml = format!(
            "env: dev\nstorage_path: {:?}\nhttp_server:\n  address: \"127.0.0.1:{}\"\n",
            dir.path().join("storage.db").display().to_string(),
            port
        );
        let mut config = AppConfig::from_yaml_str(&yaml)?;
        configure(&mut config);

        let storage = SqliteStorage::connect(&config).await?;
        let app = students_api::server::app(Arc::new(storage.clone()), &config);

        let listener = TcpListener::bind(config.http_server.address.as_str())
            .await
            .with_context(|| format!("failed to bind {}", config.http_server.address))?;

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            client: Client::new(),
            storage,
            _dir: dir,
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn create(&self, body: Value) -> Result<Response> {
        Ok(self.client.post(self.url("/students")).json(&body).send().await?)
    }

    /// Create and return the generated id, failing the test on anything but 201
    pub async fn create_id(&self, body: Value) -> Result<i64> {
        let res = self.create(body).await?;
        anyhow::ensure!(res.status() == 201, "expected 201 Created, got {}", res.status());
        let body = res.json::<Value>().await?;
        body["id"].as_i64().context("missing numeric id")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Assert the error envelope and return its message
pub async fn error_message(res: Response) -> Result<String> {
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "Error", "not an error envelope: {}", body);
    Ok(body["error"].as_str().context("error field must be a string")?.to_string())
}
