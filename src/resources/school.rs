use serde::{Deserialize, Serialize};

use super::{name_rule, Collection, Invariant, Resource, Scope};
use crate::validation::FieldRule;

/// Tenant root. Every other resource points at one of these via `school_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub name: String,
    pub group_max_num_students: i64,
}

impl Resource for School {
    const COLLECTION: Collection = Collection::Schools;

    fn rules() -> Vec<FieldRule> {
        vec![
            name_rule(),
            FieldRule::body("groupMaxNumStudents").integer().min(1).max(500),
        ]
    }

    fn invariants() -> Vec<Invariant<Self>> {
        vec![Invariant::Unique { field: "name", scope: Scope::Global }]
    }

    fn school_id(&self) -> Option<&str> {
        None
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.name.to_lowercase())
    }
}
