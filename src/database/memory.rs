use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::store::{DocumentStore, Filter, Projection, StoreError};
use crate::resources::Collection;
use crate::validation::Document;

#[derive(Default)]
struct Inner {
    documents: HashMap<Collection, Vec<Document>>,
    // (collection, unique key) -> document id
    keys: HashMap<(Collection, String), String>,
}

/// In-process document store. Same semantics as the Postgres store; data
/// lives as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn id_of(doc: &Document) -> Result<String, StoreError> {
    doc.get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Malformed("document without _id".to_string()))
}

impl Inner {
    fn claim_key(&mut self, collection: Collection, key: Option<String>, id: &str) -> Result<(), StoreError> {
        if let Some(key) = key {
            let slot = (collection, key);
            if self.keys.get(&slot).is_some_and(|owner| owner != id) {
                return Err(StoreError::Duplicate(collection));
            }
            self.keys.insert(slot, id.to_string());
        }
        Ok(())
    }

    fn release_keys(&mut self, collection: Collection, id: &str) {
        self.keys.retain(|(c, _), owner| !(*c == collection && owner == id));
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(
        &self,
        collection: Collection,
        doc: Document,
        unique_key: Option<String>,
    ) -> Result<Document, StoreError> {
        let id = id_of(&doc)?;
        let mut inner = self.inner.write().await;
        inner.claim_key(collection, unique_key, &id)?;
        inner.documents.entry(collection).or_default().push(doc.clone());
        debug!("Inserted {} into {}", id, collection.name());
        Ok(doc)
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .documents
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(d))
                    .map(|d| projection.apply(d.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .documents
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
            .map(|d| projection.apply(d.clone())))
    }

    async fn find_one_and_replace(
        &self,
        collection: Collection,
        filter: &Filter,
        mut doc: Document,
        unique_key: Option<String>,
    ) -> Result<Option<Document>, StoreError> {
        let mut inner = self.inner.write().await;

        let position = inner
            .documents
            .get(&collection)
            .and_then(|docs| docs.iter().position(|d| filter.matches(d)));
        let Some(position) = position else {
            return Ok(None);
        };

        let existing = inner.documents[&collection][position].clone();
        let id = id_of(&existing)?;

        if let Some(key) = &unique_key {
            let slot = (collection, key.clone());
            if inner.keys.get(&slot).is_some_and(|owner| *owner != id) {
                return Err(StoreError::Duplicate(collection));
            }
        }
        inner.release_keys(collection, &id);
        inner.claim_key(collection, unique_key, &id)?;

        doc.insert("_id".to_string(), Value::String(id.clone()));
        if let Some(created) = existing.get("createdAt") {
            doc.insert("createdAt".to_string(), created.clone());
        }
        if let Some(docs) = inner.documents.get_mut(&collection) {
            docs[position] = doc.clone();
        }
        debug!("Replaced {} in {}", id, collection.name());
        Ok(Some(doc))
    }

    async fn find_one_and_delete(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let mut inner = self.inner.write().await;
        let removed = match inner.documents.get_mut(&collection) {
            Some(docs) => match docs.iter().position(|d| filter.matches(d)) {
                Some(position) => Some(docs.remove(position)),
                None => None,
            },
            None => None,
        };
        if let Some(doc) = &removed {
            let id = id_of(doc)?;
            inner.release_keys(collection, &id);
            debug!("Deleted {} from {}", id, collection.name());
        }
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
