// Resource definitions.
//
// Every entity is a typed record plus two tables: the field rules the request
// body must pass, and the invariants the controller enforces against stored
// data before writing. The generic controller in `handlers::crud` consumes
// both, so adding a resource means adding one file here and one route line.

pub mod breaks;
pub mod field;
pub mod group;
pub mod level;
pub mod schedule;
pub mod school;
pub mod subject;
pub mod teacher;
pub mod teacher_field;
pub mod user;

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::validation::{Document, FieldRule};

pub use breaks::Break;
pub use field::Field;
pub use group::Group;
pub use level::Level;
pub use schedule::Schedule;
pub use school::School;
pub use subject::Subject;
pub use teacher::Teacher;
pub use teacher_field::TeacherField;
pub use user::User;

/// Minutes in a day; every schedule offset lives in `0..MINUTES_PER_DAY`
pub const MINUTES_PER_DAY: i64 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Schools,
    Users,
    Teachers,
    Fields,
    TeacherFields,
    Schedules,
    Breaks,
    Levels,
    Groups,
    Subjects,
}

impl Collection {
    pub const ALL: [Collection; 10] = [
        Collection::Schools,
        Collection::Users,
        Collection::Teachers,
        Collection::Fields,
        Collection::TeacherFields,
        Collection::Schedules,
        Collection::Breaks,
        Collection::Levels,
        Collection::Groups,
        Collection::Subjects,
    ];

    /// Storage name
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Schools => "schools",
            Collection::Users => "users",
            Collection::Teachers => "teachers",
            Collection::Fields => "fields",
            Collection::TeacherFields => "teacher_fields",
            Collection::Schedules => "schedules",
            Collection::Breaks => "breaks",
            Collection::Levels => "levels",
            Collection::Groups => "groups",
            Collection::Subjects => "subjects",
        }
    }

    /// URL segment under /api/v1
    pub fn path(&self) -> &'static str {
        match self {
            Collection::TeacherFields => "teacher-fields",
            other => other.name(),
        }
    }

    /// Singular, capitalized, for messages ("Group not found")
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Schools => "School",
            Collection::Users => "User",
            Collection::Teachers => "Teacher",
            Collection::Fields => "Field",
            Collection::TeacherFields => "Teacher field",
            Collection::Schedules => "Schedule",
            Collection::Breaks => "Break",
            Collection::Levels => "Level",
            Collection::Groups => "Group",
            Collection::Subjects => "Subject",
        }
    }

    /// Plural, lowercase, for list messages ("No groups found")
    pub fn plural(&self) -> &'static str {
        match self {
            Collection::TeacherFields => "teacher fields",
            other => other.name(),
        }
    }

    /// Everything except the tenant root carries a `school_id`
    pub fn is_tenant_scoped(&self) -> bool {
        !matches!(self, Collection::Schools)
    }
}

/// Reach of a uniqueness rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Tenant,
    Global,
}

/// Business rule evaluated by the controller with data fetched at request time
pub enum Invariant<R> {
    /// No other record in scope may have the same value (case-insensitive) -> 409
    Unique { field: &'static str, scope: Scope },
    /// No other record in the tenant may have the same pair of values -> 409
    UniquePair { fields: (&'static str, &'static str), message: &'static str },
    /// `field` holds the id of a record in `target`; it must exist (404) and
    /// belong to the request's school (400). `populate` joins one more level.
    References {
        field: &'static str,
        target: Collection,
        populate: Option<(&'static str, Collection)>,
    },
    /// Arbitrary check against the record and the references resolved so far -> 400
    Check(fn(&R, &Related) -> Result<(), ApiError>),
}

/// Related records resolved while enforcing invariants, keyed by the
/// referencing field
#[derive(Debug, Default)]
pub struct Related {
    records: HashMap<&'static str, Document>,
}

impl Related {
    pub fn insert(&mut self, field: &'static str, doc: Document) {
        self.records.insert(field, doc);
    }

    pub fn get(&self, field: &str) -> Option<&Document> {
        self.records.get(field)
    }

    /// The record referenced by `field`, which an earlier invariant must have resolved
    pub fn require(&self, field: &str) -> Result<&Document, ApiError> {
        self.get(field)
            .ok_or_else(|| ApiError::internal(format!("reference {} was not resolved", field)))
    }

    pub fn int(&self, field: &str, key: &str) -> Result<i64, ApiError> {
        self.require(field)?
            .get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| ApiError::internal(format!("{}.{} is not an integer", field, key)))
    }

    pub fn str(&self, field: &str, key: &str) -> Option<&str> {
        self.get(field)?.get(key).and_then(Value::as_str)
    }

    /// A populated document nested under `key` of the record behind `field`
    pub fn nested(&self, field: &str, key: &str) -> Option<&Document> {
        self.get(field)?.get(key).and_then(Value::as_object)
    }
}

/// A persisted entity exposed through the generic CRUD endpoints
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Fields never returned to clients
    const HIDDEN: &'static [&'static str] = &[];

    /// Request body rules for create and update
    fn rules() -> Vec<FieldRule>;

    /// Invariants in evaluation order
    fn invariants() -> Vec<Invariant<Self>> {
        Vec::new()
    }

    /// Owning tenant; `None` only for the tenant root
    fn school_id(&self) -> Option<&str>;

    /// Key the store keeps unique within the collection
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Last transformation before the record is written
    fn prepare(&mut self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// `school_id` rule shared by every tenant-scoped resource
pub fn school_rule() -> FieldRule {
    FieldRule::body("school_id").string().object_id()
}

/// Resource name rule: free text, 1 to 50 characters
pub fn name_rule() -> FieldRule {
    FieldRule::body("name").text().length(1, 50)
}

/// Unique key for names that only need to be unique inside one school
pub fn tenant_name_key(school_id: &str, name: &str) -> String {
    format!("{}:{}", school_id, name.to_lowercase())
}
