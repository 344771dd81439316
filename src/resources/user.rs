use serde::{Deserialize, Serialize};

use super::{school_rule, Collection, Invariant, Resource, Scope};
use crate::auth::password;
use crate::error::ApiError;
use crate::validation::FieldRule;

pub const ROLES: &[&str] = &["headmaster", "coordinator", "teacher"];
pub const STATUSES: &[&str] = &["active", "inactive", "suspended"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "school_id")]
    pub school_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maternal_surname: Option<String>,
    pub email: String,
    pub password: String,
    pub role: String,
    pub status: String,
    pub has_teaching_func: bool,
}

impl Resource for User {
    const COLLECTION: Collection = Collection::Users;
    const HIDDEN: &'static [&'static str] = &["password"];

    fn rules() -> Vec<FieldRule> {
        vec![
            school_rule(),
            FieldRule::body("firstName").text().length(1, 50),
            FieldRule::body("lastName").text().length(1, 50),
            FieldRule::body("maternalSurname").optional().text().length(1, 50),
            FieldRule::body("email").email().length(3, 100),
            FieldRule::body("password").string().length(8, 64),
            FieldRule::body("role").one_of(ROLES),
            FieldRule::body("status").one_of(STATUSES),
            FieldRule::body("hasTeachingFunc").boolean(),
        ]
    }

    fn invariants() -> Vec<Invariant<Self>> {
        vec![
            Invariant::Unique { field: "email", scope: Scope::Global },
            Invariant::References { field: "school_id", target: Collection::Schools, populate: None },
        ]
    }

    fn school_id(&self) -> Option<&str> {
        Some(&self.school_id)
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.to_lowercase())
    }

    /// Passwords are stored only as hashes
    fn prepare(&mut self) -> Result<(), ApiError> {
        self.password = password::hash_password(&self.password)?;
        Ok(())
    }
}
