use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{name_rule, school_rule, tenant_name_key, Collection, Invariant, Related, Resource, Scope};
use crate::error::ApiError;
use crate::validation::FieldRule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub school_id: String,
    pub level_id: String,
    pub name: String,
    #[serde(rename = "numberStudents")]
    pub number_students: i64,
}

impl Resource for Group {
    const COLLECTION: Collection = Collection::Groups;

    fn rules() -> Vec<FieldRule> {
        vec![
            school_rule(),
            FieldRule::body("level_id").string().object_id(),
            name_rule(),
            FieldRule::body("numberStudents").integer().min(1),
        ]
    }

    fn invariants() -> Vec<Invariant<Self>> {
        vec![
            Invariant::Unique { field: "name", scope: Scope::Tenant },
            Invariant::References { field: "school_id", target: Collection::Schools, populate: None },
            Invariant::References {
                field: "level_id",
                target: Collection::Levels,
                populate: Some(("school_id", Collection::Schools)),
            },
            Invariant::Check(within_school_ceiling),
        ]
    }

    fn school_id(&self) -> Option<&str> {
        Some(&self.school_id)
    }

    fn unique_key(&self) -> Option<String> {
        Some(tenant_name_key(&self.school_id, &self.name))
    }
}

/// The level's school caps how many students a group may hold
fn within_school_ceiling(group: &Group, related: &Related) -> Result<(), ApiError> {
    let ceiling = related
        .nested("level_id", "school_id")
        .and_then(|school| school.get("groupMaxNumStudents"))
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::bad_request("Level is not linked to a school"))?;

    if group.number_students > ceiling {
        tracing::warn!("Group '{}' rejected: {} students over ceiling {}", group.name, group.number_students, ceiling);
        return Err(ApiError::bad_request(format!("Group cannot exceed {} students", ceiling)));
    }
    Ok(())
}
