use serde::{Deserialize, Serialize};

use super::{name_rule, school_rule, tenant_name_key, Collection, Invariant, Resource, Scope};
use crate::validation::FieldRule;

/// A course taught to one group within one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub school_id: String,
    pub group_id: String,
    pub field_id: String,
    pub name: String,
    #[serde(rename = "classUnits")]
    pub class_units: i64,
}

impl Resource for Subject {
    const COLLECTION: Collection = Collection::Subjects;

    fn rules() -> Vec<FieldRule> {
        vec![
            school_rule(),
            FieldRule::body("group_id").string().object_id(),
            FieldRule::body("field_id").string().object_id(),
            name_rule(),
            FieldRule::body("classUnits").integer().min(1).max(50),
        ]
    }

    fn invariants() -> Vec<Invariant<Self>> {
        vec![
            Invariant::Unique { field: "name", scope: Scope::Tenant },
            Invariant::References { field: "school_id", target: Collection::Schools, populate: None },
            Invariant::References { field: "group_id", target: Collection::Groups, populate: None },
            Invariant::References { field: "field_id", target: Collection::Fields, populate: None },
        ]
    }

    fn school_id(&self) -> Option<&str> {
        Some(&self.school_id)
    }

    fn unique_key(&self) -> Option<String> {
        Some(tenant_name_key(&self.school_id, &self.name))
    }
}
