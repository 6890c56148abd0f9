mod common;

use anyhow::Result;
use common::{TestServer, OPEN_CONFIG};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_reports_declared_resources() -> Result<()> {
    let server = TestServer::start(OPEN_CONFIG).await?;

    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["resources"], json!(["posts", "comments"]));
    assert!(body["timestamp"].is_string(), "missing timestamp: {}", body);
    Ok(())
}

#[tokio::test]
async fn health_is_unavailable_with_corrupt_document() -> Result<()> {
    let server = TestServer::start(OPEN_CONFIG).await?;
    std::fs::write(server.database_path(), "not json")?;

    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.json::<Value>().await?, json!({"error": "database unavailable"}));
    Ok(())
}

#[tokio::test]
async fn first_start_seeds_empty_buckets() -> Result<()> {
    let server = TestServer::start(OPEN_CONFIG).await?;

    assert_eq!(
        server.document()?,
        json!({
            "resources": [
                {"resource": "posts", "items": []},
                {"resource": "comments", "items": []}
            ]
        })
    );
    assert!(server.dir.path().join("public").is_dir());
    assert!(server.dir.path().join("uploads").is_dir());
    Ok(())
}

#[tokio::test]
async fn public_folder_is_served_as_fallback() -> Result<()> {
    let server = TestServer::start(OPEN_CONFIG).await?;
    std::fs::write(server.dir.path().join("public/hello.txt"), "hi there")?;

    let res = reqwest::get(server.url("/hello.txt")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "hi there");

    let res = reqwest::get(server.url("/missing.txt")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
