mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_reports_ok() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::get(format!("{}/health", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(body["payload"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_lists_resource_paths() -> Result<()> {
    let server = common::ensure_server().await?;
    let body = reqwest::get(&server.base_url).await?.json::<Value>().await?;
    let resources = body["payload"]["resources"].as_array().cloned().unwrap_or_default();
    assert_eq!(resources.len(), 10);
    assert!(resources.iter().any(|r| r == "/api/v1/teacher-fields"), "{}", body);
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_404() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::get(format!("{}/api/v1/classrooms", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(common::msg(&body), "Route not found");
    assert_eq!(body["success"], Value::Bool(false));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_rejected_before_validation() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .post(format!("{}/api/v1/schools", server.base_url))
        .header("content-type", "application/json")
        .body(r#"{"name": "North","#)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(common::msg(&body), "Malformed JSON in request body");
    Ok(())
}
