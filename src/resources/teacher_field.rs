use serde::{Deserialize, Serialize};

use super::{school_rule, Collection, Invariant, Resource};
use crate::validation::FieldRule;

/// Assignment of a field to a teacher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherField {
    pub school_id: String,
    pub teacher_id: String,
    pub field_id: String,
}

impl Resource for TeacherField {
    const COLLECTION: Collection = Collection::TeacherFields;

    fn rules() -> Vec<FieldRule> {
        vec![
            school_rule(),
            FieldRule::body("teacher_id").string().object_id(),
            FieldRule::body("field_id").string().object_id(),
        ]
    }

    fn invariants() -> Vec<Invariant<Self>> {
        vec![
            Invariant::UniquePair {
                fields: ("teacher_id", "field_id"),
                message: "Field already assigned to this teacher",
            },
            Invariant::References { field: "school_id", target: Collection::Schools, populate: None },
            Invariant::References { field: "teacher_id", target: Collection::Teachers, populate: None },
            Invariant::References { field: "field_id", target: Collection::Fields, populate: None },
        ]
    }

    fn school_id(&self) -> Option<&str> {
        Some(&self.school_id)
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}:{}:{}", self.school_id, self.teacher_id, self.field_id))
    }
}
