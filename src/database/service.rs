use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use super::store::{DocumentStore, Filter, Projection, StoreError};
use crate::resources::{Collection, Resource};
use crate::validation::{new_id, Document};

/// Data access for one collection inside one school. Controllers never reach
/// the store except through this.
///
/// The school is fixed when the service is built: every filter gets a
/// `school_id` condition and every write is stamped with it. Tenant-scoped
/// collections cannot be opened without a school; only the root collection
/// is unscoped.
#[derive(Clone)]
pub struct ResourceService {
    store: Arc<dyn DocumentStore>,
    collection: Collection,
    projection: Projection,
    school_id: Option<String>,
}

impl ResourceService {
    pub fn scoped(
        store: Arc<dyn DocumentStore>,
        collection: Collection,
        school_id: Option<&str>,
    ) -> Result<Self, StoreError> {
        let school_id = if collection.is_tenant_scoped() {
            Some(school_id.ok_or(StoreError::MissingTenant(collection))?.to_string())
        } else {
            None
        };
        Ok(Self {
            store,
            collection,
            projection: Projection::All,
            school_id,
        })
    }

    /// Service for a resource, hiding the fields it never returns
    pub fn of<R: Resource>(store: Arc<dyn DocumentStore>, school_id: Option<&str>) -> Result<Self, StoreError> {
        let mut service = Self::scoped(store, R::COLLECTION, school_id)?;
        service.projection = Projection::excluding(R::HIDDEN);
        Ok(service)
    }

    fn scope(&self, filter: &Filter) -> Filter {
        filter.clone().tenant(self.school_id.as_deref())
    }

    fn stamp_tenant(&self, doc: &mut Document) {
        if let Some(school_id) = &self.school_id {
            doc.insert("school_id".to_string(), Value::String(school_id.clone()));
        }
    }

    /// Assign an id and timestamps, then store the record
    pub async fn insert(&self, mut doc: Document, unique_key: Option<String>) -> Result<Document, StoreError> {
        let now = Value::String(Utc::now().to_rfc3339());
        self.stamp_tenant(&mut doc);
        doc.insert("_id".to_string(), Value::String(new_id()));
        doc.insert("createdAt".to_string(), now.clone());
        doc.insert("updatedAt".to_string(), now);

        let created = self.store.insert(self.collection, doc, unique_key).await?;
        Ok(self.projection.apply(created))
    }

    /// Every record of the school, or of the whole collection for the tenant root
    pub async fn find_all_by_tenant(&self) -> Result<Vec<Document>, StoreError> {
        self.store
            .find(self.collection, &self.scope(&Filter::new()), &self.projection)
            .await
    }

    pub async fn find_one_by_property(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let filter = self.scope(filter);
        debug!("find_one {} {:?}", self.collection.name(), filter);
        self.store.find_one(self.collection, &filter, &self.projection).await
    }

    pub async fn find_many_by_property(&self, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let filter = self.scope(filter);
        debug!("find_many {} {:?}", self.collection.name(), filter);
        self.store.find(self.collection, &filter, &self.projection).await
    }

    pub async fn exists(&self, filter: &Filter) -> Result<bool, StoreError> {
        Ok(self.find_one_by_property(filter).await?.is_some())
    }

    /// Whether any school holds a match. Only answers yes or no, for fields
    /// that are unique across schools (emails, user links).
    pub async fn exists_anywhere(&self, filter: &Filter) -> Result<bool, StoreError> {
        debug!("exists_anywhere {} {:?}", self.collection.name(), filter);
        let found = self.store.find_one(self.collection, filter, &Projection::All).await?;
        Ok(found.is_some())
    }

    /// Whole-record replace of the first match. `None` when nothing matched.
    pub async fn update_one_by_filter(
        &self,
        filter: &Filter,
        mut doc: Document,
        unique_key: Option<String>,
    ) -> Result<Option<Document>, StoreError> {
        doc.remove("_id");
        doc.remove("createdAt");
        self.stamp_tenant(&mut doc);
        doc.insert("updatedAt".to_string(), Value::String(Utc::now().to_rfc3339()));

        let updated = self
            .store
            .find_one_and_replace(self.collection, &self.scope(filter), doc, unique_key)
            .await?;
        Ok(updated.map(|d| self.projection.apply(d)))
    }

    pub async fn delete_one_by_filter(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let deleted = self
            .store
            .find_one_and_delete(self.collection, &self.scope(filter))
            .await?;
        Ok(deleted.map(|d| self.projection.apply(d)))
    }

    /// Fetch a record by id in any school and, when `populate` names one of
    /// its reference fields, replace that field's id with the referenced
    /// record. Callers resolving references check ownership on the result.
    pub async fn find_by_id_with_related(
        store: &Arc<dyn DocumentStore>,
        collection: Collection,
        id: &str,
        populate: Option<(&str, Collection)>,
    ) -> Result<Option<Document>, StoreError> {
        let Some(mut doc) = store.find_one(collection, &Filter::by_id(id), &Projection::All).await? else {
            return Ok(None);
        };

        if let Some((field, target)) = populate {
            if let Some(related_id) = doc.get(field).and_then(Value::as_str).map(str::to_string) {
                let related = store
                    .find_one(target, &Filter::by_id(&related_id), &Projection::All)
                    .await?;
                if let Some(related) = related {
                    doc.insert(field.to_string(), Value::Object(related));
                }
            }
        }
        Ok(Some(doc))
    }
}
