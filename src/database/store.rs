use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::resources::Collection;
use crate::validation::Document;

/// Errors from a DocumentStore
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate unique key in {}", .0.name())]
    Duplicate(Collection),

    #[error("{} requires a school_id", .0.name())]
    MissingTenant(Collection),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A single predicate on a top-level document field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    /// String equality under case-insensitive collation
    EqIgnoreCase(String, String),
    Ne(String, Value),
}

impl Condition {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Condition::Eq(field, value) => doc.get(field) == Some(value),
            Condition::EqIgnoreCase(field, value) => doc
                .get(field)
                .and_then(Value::as_str)
                .map(|s| s.to_lowercase() == value.to_lowercase())
                .unwrap_or(false),
            Condition::Ne(field, value) => doc.get(field) != Some(value),
        }
    }
}

/// Conjunction of conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self::new().eq("_id", id)
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.to_string(), value.into()));
        self
    }

    pub fn eq_ignore_case(mut self, field: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::EqIgnoreCase(field.to_string(), value.to_string()));
        self
    }

    pub fn ne(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Ne(field.to_string(), value.into()));
        self
    }

    /// Restrict to one tenant; `None` leaves the filter unscoped (root collection)
    pub fn tenant(self, school_id: Option<&str>) -> Self {
        match school_id {
            Some(id) => self.eq("school_id", id),
            None => self,
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}

/// Which fields a read returns
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Projection {
    #[default]
    All,
    Exclude(Vec<String>),
}

impl Projection {
    pub fn excluding(fields: &[&str]) -> Self {
        if fields.is_empty() {
            Projection::All
        } else {
            Projection::Exclude(fields.iter().map(|f| f.to_string()).collect())
        }
    }

    pub fn apply(&self, mut doc: Document) -> Document {
        if let Projection::Exclude(fields) = self {
            for f in fields {
                doc.remove(f);
            }
        }
        doc
    }

    pub fn excluded(&self) -> Vec<String> {
        match self {
            Projection::All => Vec::new(),
            Projection::Exclude(fields) => fields.clone(),
        }
    }
}

/// The only component allowed to touch persisted documents.
///
/// Documents always carry their id under `_id`. `unique_key`, when present,
/// must be unique within a collection; writes that would break that return
/// `StoreError::Duplicate`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(
        &self,
        collection: Collection,
        doc: Document,
        unique_key: Option<String>,
    ) -> Result<Document, StoreError>;

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Option<Document>, StoreError>;

    /// Replace the first matching document, keeping its `_id` and `createdAt`
    async fn find_one_and_replace(
        &self,
        collection: Collection,
        filter: &Filter,
        doc: Document,
        unique_key: Option<String>,
    ) -> Result<Option<Document>, StoreError>;

    async fn find_one_and_delete(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// Release backend resources on shutdown
    async fn close(&self) {}
}
