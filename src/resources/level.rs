use serde::{Deserialize, Serialize};

use super::{name_rule, school_rule, tenant_name_key, Collection, Invariant, Resource, Scope};
use crate::validation::FieldRule;

/// Grade level; groups hang off a level and inherit its schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub school_id: String,
    pub schedule_id: String,
    pub name: String,
}

impl Resource for Level {
    const COLLECTION: Collection = Collection::Levels;

    fn rules() -> Vec<FieldRule> {
        vec![
            school_rule(),
            FieldRule::body("schedule_id").string().object_id(),
            name_rule(),
        ]
    }

    fn invariants() -> Vec<Invariant<Self>> {
        vec![
            Invariant::Unique { field: "name", scope: Scope::Tenant },
            Invariant::References { field: "school_id", target: Collection::Schools, populate: None },
            Invariant::References { field: "schedule_id", target: Collection::Schedules, populate: None },
        ]
    }

    fn school_id(&self) -> Option<&str> {
        Some(&self.school_id)
    }

    fn unique_key(&self) -> Option<String> {
        Some(tenant_name_key(&self.school_id, &self.name))
    }
}
