use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{school_rule, Collection, Invariant, Related, Resource, Scope};
use crate::error::ApiError;
use crate::validation::FieldRule;

pub const CONTRACT_TYPES: &[&str] = &["full-time", "part-time", "substitute"];

/// Weekly hours no teacher can be made assignable beyond
pub const MAX_ASSIGNABLE_HOURS: i64 = 40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    #[serde(rename = "school_id")]
    pub school_id: String,
    #[serde(rename = "user_id")]
    pub user_id: String,
    #[serde(rename = "coordinator_id")]
    pub coordinator_id: String,
    pub contract_type: String,
    pub hours_assignable: i64,
    pub hours_assigned: i64,
}

impl Resource for Teacher {
    const COLLECTION: Collection = Collection::Teachers;

    fn rules() -> Vec<FieldRule> {
        vec![
            school_rule(),
            FieldRule::body("user_id").string().object_id(),
            FieldRule::body("coordinator_id").string().object_id(),
            FieldRule::body("contractType").one_of(CONTRACT_TYPES),
            FieldRule::body("hoursAssignable").integer().min(0).max(MAX_ASSIGNABLE_HOURS),
            FieldRule::body("hoursAssigned").integer().min(0).custom(
                |v, body| v.as_i64() <= body.get("hoursAssignable").and_then(Value::as_i64),
                "hoursAssigned cannot exceed hoursAssignable",
            ),
        ]
    }

    fn invariants() -> Vec<Invariant<Self>> {
        vec![
            Invariant::Unique { field: "user_id", scope: Scope::Global },
            Invariant::References { field: "school_id", target: Collection::Schools, populate: None },
            Invariant::References { field: "user_id", target: Collection::Users, populate: None },
            Invariant::Check(user_can_teach),
            Invariant::References { field: "coordinator_id", target: Collection::Users, populate: None },
            Invariant::Check(coordinator_is_active_coordinator),
        ]
    }

    fn school_id(&self) -> Option<&str> {
        Some(&self.school_id)
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.user_id.clone())
    }
}

fn user_can_teach(_: &Teacher, related: &Related) -> Result<(), ApiError> {
    let user = related.require("user_id")?;
    if user.get("hasTeachingFunc").and_then(Value::as_bool) != Some(true) {
        return Err(ApiError::bad_request("User does not have a teaching function"));
    }
    Ok(())
}

fn coordinator_is_active_coordinator(_: &Teacher, related: &Related) -> Result<(), ApiError> {
    related.require("coordinator_id")?;
    if related.str("coordinator_id", "role") != Some("coordinator") {
        return Err(ApiError::bad_request("Coordinator must have the coordinator role"));
    }
    if related.str("coordinator_id", "status") != Some("active") {
        return Err(ApiError::bad_request("Coordinator must be active"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn related(role: &str, status: &str) -> Related {
        let mut related = Related::default();
        related.insert(
            "coordinator_id",
            json!({ "role": role, "status": status }).as_object().cloned().unwrap(),
        );
        related
    }

    fn teacher() -> Teacher {
        serde_json::from_value(json!({
            "school_id": "507f1f77bcf86cd799439011",
            "user_id": "507f1f77bcf86cd799439012",
            "coordinator_id": "507f1f77bcf86cd799439013",
            "contractType": "full-time",
            "hoursAssignable": 30,
            "hoursAssigned": 20
        }))
        .unwrap()
    }

    #[test]
    fn coordinator_must_have_role_and_be_active() {
        let t = teacher();
        assert!(coordinator_is_active_coordinator(&t, &related("coordinator", "active")).is_ok());

        let err = coordinator_is_active_coordinator(&t, &related("teacher", "active")).unwrap_err();
        assert_eq!(err.message(), "Coordinator must have the coordinator role");

        let err = coordinator_is_active_coordinator(&t, &related("coordinator", "inactive")).unwrap_err();
        assert_eq!(err.message(), "Coordinator must be active");
    }

    #[test]
    fn wire_names_mix_snake_ids_and_camel_fields() {
        let v = serde_json::to_value(teacher()).unwrap();
        assert!(v.get("user_id").is_some());
        assert!(v.get("hoursAssignable").is_some());
        assert!(v.get("contractType").is_some());
    }
}
