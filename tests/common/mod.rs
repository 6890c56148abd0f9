#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use tempfile::TempDir;

use jsonver::config::AppConfig;
use jsonver::server::{self, AppState};

pub const OPEN_CONFIG: &str = r#"
apiVersion: v1
jsonDatabaseName: database.json
publicFolderName: public
uploadsFolderName: uploads
resources:
  - name: posts
  - name: comments
"#;

pub const AUTH_CONFIG: &str = r#"
apiVersion: v1
jsonDatabaseName: database.json
uploadsFolderName: uploads
requiresAuthorization: true
jwtSecret: integration-secret
jwtExpirationTime: 300
adminUsername: admin
adminPassword: password
resources:
  - name: posts
"#;

/// A server running inside the test's runtime, rooted in its own temp directory
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub dir: TempDir,
}

impl TestServer {
    pub async fn start(yaml: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create temp dir")?;
        let mut config = AppConfig::from_yaml(yaml, dir.path())?;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        config.server.hostname = "127.0.0.1".into();
        config.server.port = port;

        let state = AppState::new(config)?;
        server::bootstrap(&state).await?;

        let bind_addr = state.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", bind_addr))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, server::app(state)).await;
        });

        let server = Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            dir,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn database_path(&self) -> PathBuf {
        self.dir.path().join("database.json")
    }

    /// Current on-disk document
    pub fn document(&self) -> Result<serde_json::Value> {
        let text = std::fs::read_to_string(self.database_path())?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Log in and return the bearer token
pub async fn login(server: &TestServer, username: &str, password: &str) -> Result<String> {
    let res = reqwest::Client::new()
        .post(server.url("/login"))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed with {}", res.status());

    let body = res.json::<serde_json::Value>().await?;
    body["token"]
        .as_str()
        .map(str::to_string)
        .context("token missing from login response")
}
