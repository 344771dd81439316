use serde::{Deserialize, Serialize};

use super::{name_rule, school_rule, tenant_name_key, Collection, Invariant, Resource, Scope};
use crate::validation::FieldRule;

/// Subject-matter domain a teacher can teach ("Mathematics")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub school_id: String,
    pub name: String,
}

impl Resource for Field {
    const COLLECTION: Collection = Collection::Fields;

    fn rules() -> Vec<FieldRule> {
        vec![school_rule(), name_rule()]
    }

    fn invariants() -> Vec<Invariant<Self>> {
        vec![
            Invariant::Unique { field: "name", scope: Scope::Tenant },
            Invariant::References { field: "school_id", target: Collection::Schools, populate: None },
        ]
    }

    fn school_id(&self) -> Option<&str> {
        Some(&self.school_id)
    }

    fn unique_key(&self) -> Option<String> {
        Some(tenant_name_key(&self.school_id, &self.name))
    }
}
