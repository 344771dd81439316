mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{msg, token, Api};

fn teacher(school: &str, user: &str, coordinator: &str) -> Value {
    json!({
        "school_id": school,
        "user_id": user,
        "coordinator_id": coordinator,
        "contractType": "full-time",
        "hoursAssignable": 30,
        "hoursAssigned": 10
    })
}

#[tokio::test]
async fn passwords_are_never_returned() -> Result<()> {
    let api = Api::new().await?;
    let school = api.school(40).await?;
    let (status, body) = api
        .post(
            "/users",
            json!({
                "school_id": school,
                "firstName": "Rosa",
                "lastName": "Diaz",
                "email": format!("rosa.{}@school.test", token()),
                "password": "correct-horse",
                "role": "headmaster",
                "status": "active",
                "hasTeachingFunc": false
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert!(body["payload"].get("password").is_none());

    let (_, body) = api.get("/users", json!({ "school_id": school })).await?;
    assert!(body["payload"][0].get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn emails_are_unique_across_schools() -> Result<()> {
    let api = Api::new().await?;
    let north = api.school(40).await?;
    let south = api.school(40).await?;
    let email = format!("dup.{}@school.test", token());
    let user = |school: &str, email: &str| {
        json!({
            "school_id": school,
            "firstName": "Luis",
            "lastName": "Mora",
            "email": email,
            "password": "correct-horse",
            "role": "teacher",
            "status": "active",
            "hasTeachingFunc": true
        })
    };

    api.create("/users", user(&north, &email)).await?;
    let (status, _) = api.post("/users", user(&south, &email.to_uppercase())).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn coordinators_must_be_active_coordinators() -> Result<()> {
    let api = Api::new().await?;
    let school = api.school(40).await?;
    let user = api.user(&school, "teacher", "active", true).await?;
    let not_coordinator = api.user(&school, "teacher", "active", true).await?;
    let inactive = api.user(&school, "coordinator", "inactive", false).await?;
    let coordinator = api.user(&school, "coordinator", "active", false).await?;

    let (status, body) = api.post("/teachers", teacher(&school, &user, &not_coordinator)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(msg(&body), "Coordinator must have the coordinator role");

    let (status, body) = api.post("/teachers", teacher(&school, &user, &inactive)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(msg(&body), "Coordinator must be active");

    let (status, body) = api.post("/teachers", teacher(&school, &user, &coordinator)).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    // one teacher record per user
    let (status, _) = api.post("/teachers", teacher(&school, &user, &coordinator)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn teachers_need_a_teaching_function_and_sane_hours() -> Result<()> {
    let api = Api::new().await?;
    let school = api.school(40).await?;
    let admin = api.user(&school, "headmaster", "active", false).await?;
    let coordinator = api.user(&school, "coordinator", "active", false).await?;

    let (status, body) = api.post("/teachers", teacher(&school, &admin, &coordinator)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(msg(&body), "User does not have a teaching function");

    let user = api.user(&school, "teacher", "active", true).await?;
    let mut body = teacher(&school, &user, &coordinator);
    body["hoursAssigned"] = json!(31);
    let (status, body) = api.post("/teachers", body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"][0]["param"], "hoursAssigned");
    Ok(())
}

#[tokio::test]
async fn fields_are_assigned_to_a_teacher_once() -> Result<()> {
    let api = Api::new().await?;
    let school = api.school(40).await?;
    let user = api.user(&school, "teacher", "active", true).await?;
    let coordinator = api.user(&school, "coordinator", "active", false).await?;
    let teacher_id = api.create("/teachers", teacher(&school, &user, &coordinator)).await?;
    let field = api.create("/fields", json!({ "school_id": school, "name": "Chemistry" })).await?;
    let assignment = json!({ "school_id": school, "teacher_id": teacher_id, "field_id": field });

    let (status, body) = api.post("/teacher-fields", assignment.clone()).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(msg(&body), "Teacher field created");

    let (status, body) = api.post("/teacher-fields", assignment).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(msg(&body), "Field already assigned to this teacher");
    Ok(())
}
