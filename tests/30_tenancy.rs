mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{msg, unique, Api};

#[tokio::test]
async fn records_are_invisible_to_other_schools() -> Result<()> {
    let api = Api::new().await?;
    let north = api.school(40).await?;
    let south = api.school(40).await?;
    let field = api.create("/fields", json!({ "school_id": north, "name": unique("Math") })).await?;
    let item = format!("/fields/{}", field);

    let (status, body) = api.get("/fields", json!({ "school_id": south })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(msg(&body), "No fields found");

    let (status, body) = api.get(&item, json!({ "school_id": south })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(msg(&body), "Field not found");

    let (status, body) = api
        .put(&item, json!({ "school_id": south, "name": unique("Stolen") }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND, "{}", body);

    let (status, body) = api.delete(&item, json!({ "school_id": south })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(msg(&body), "Field not deleted");

    let (status, body) = api.get("/fields", json!({ "school_id": north })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn tenant_reads_require_a_school_id() -> Result<()> {
    let api = Api::new().await?;
    let (status, body) = api.get("/groups", json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"][0]["param"], "school_id");
    Ok(())
}

#[tokio::test]
async fn same_name_is_allowed_in_different_schools() -> Result<()> {
    let api = Api::new().await?;
    let north = api.school(40).await?;
    let south = api.school(40).await?;
    let name = unique("History");

    api.create("/fields", json!({ "school_id": north, "name": name })).await?;
    api.create("/fields", json!({ "school_id": south, "name": name })).await?;

    let (status, _) = api.post("/fields", json!({ "school_id": south, "name": name })).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn renaming_onto_a_sibling_conflicts() -> Result<()> {
    let api = Api::new().await?;
    let school = api.school(40).await?;
    let taken = unique("Chemistry");
    api.create("/fields", json!({ "school_id": school, "name": taken })).await?;
    let other = api.create("/fields", json!({ "school_id": school, "name": unique("Physics") })).await?;
    let item = format!("/fields/{}", other);

    let (status, body) = api
        .put(&item, json!({ "school_id": school, "name": taken.to_lowercase() }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    let (status, body) = api.get(&item, json!({ "school_id": school })).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["payload"]["name"].as_str().unwrap_or_default().starts_with("Physics"));

    // Saving a record under its own name is not a conflict
    let name = body["payload"]["name"].clone();
    let (status, body) = api.put(&item, json!({ "school_id": school, "name": name })).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    Ok(())
}

#[tokio::test]
async fn references_cannot_cross_schools() -> Result<()> {
    let api = Api::new().await?;
    let north = api.school(40).await?;
    let south = api.school(40).await?;
    let schedule = api.schedule(&south, 420, 360, 40).await?;

    let (status, body) = api
        .post("/levels", json!({ "school_id": north, "schedule_id": schedule, "name": unique("Level") }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(msg(&body), "Schedule does not belong to this school");

    let (status, body) = api
        .post(
            "/levels",
            json!({ "school_id": north, "schedule_id": "ffffffffffffffffffffffff", "name": unique("Level") }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(msg(&body), "Schedule not found");
    Ok(())
}

#[tokio::test]
async fn unknown_school_is_404() -> Result<()> {
    let api = Api::new().await?;
    let (status, body) = api
        .post("/fields", json!({ "school_id": "ffffffffffffffffffffffff", "name": unique("Art") }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(msg(&body), "School not found");
    Ok(())
}
