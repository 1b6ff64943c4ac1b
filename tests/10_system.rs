mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn root_describes_service() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["name"], "Students API");
    assert!(body["endpoints"].is_object(), "missing endpoints: {}", body);

    Ok(())
}

#[tokio::test]
async fn health_reports_database_ok() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    assert!(body.get("timestamp").is_some(), "missing timestamp: {}", body);

    Ok(())
}

#[tokio::test]
async fn unknown_route_is_not_found() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.url("/nope")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::error_message(res).await?, "no route for /nope");

    Ok(())
}

#[tokio::test]
async fn storage_failure_surfaces_as_envelope() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    server.storage.close().await;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(common::error_message(res).await?.starts_with("database unavailable"));

    let res = server.client.get(server.url("/students")).send().await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!common::error_message(res).await?.is_empty());

    let res = server
        .create(serde_json::json!({"name": "Ann", "email": "ann@x.com", "age": 30}))
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    common::error_message(res).await?;

    Ok(())
}
