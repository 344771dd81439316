use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::database::{DocumentStore, Filter, ResourceService};
use crate::error::ApiError;
use crate::resources::{Invariant, Related, Resource, Scope};
use crate::validation::Document;

/// Evaluate `R`'s invariants in declared order against stored data.
///
/// `own_id` is the record being replaced on update; it is excluded from
/// every uniqueness lookup.
pub async fn enforce<R: Resource>(
    store: &Arc<dyn DocumentStore>,
    record: &R,
    doc: &Document,
    own_id: Option<&str>,
) -> Result<(), ApiError> {
    let collection = R::COLLECTION;
    let service = ResourceService::of::<R>(store.clone(), record.school_id())?;
    let mut related = Related::default();

    for invariant in R::invariants() {
        match invariant {
            Invariant::Unique { field, scope } => {
                let Some(value) = doc.get(field).and_then(Value::as_str) else {
                    continue;
                };
                let filter = exclude(Filter::new().eq_ignore_case(field, value), own_id);
                let taken = match scope {
                    Scope::Tenant => service.exists(&filter).await?,
                    Scope::Global => service.exists_anywhere(&filter).await?,
                };
                if taken {
                    warn!("Duplicate {} '{}' in {}", field, value, collection.name());
                    return Err(ApiError::conflict(format!(
                        "{} with {} '{}' already exists",
                        collection.label(),
                        field,
                        value
                    )));
                }
            }
            Invariant::UniquePair { fields: (first, second), message } => {
                let (Some(a), Some(b)) = (doc.get(first), doc.get(second)) else {
                    continue;
                };
                let filter = exclude(Filter::new().eq(first, a.clone()).eq(second, b.clone()), own_id);
                if service.exists(&filter).await? {
                    warn!("Duplicate ({}, {}) pair in {}", first, second, collection.name());
                    return Err(ApiError::conflict(message));
                }
            }
            Invariant::References { field, target, populate } => {
                let Some(id) = doc.get(field).and_then(Value::as_str) else {
                    continue;
                };
                let found = ResourceService::find_by_id_with_related(store, target, id, populate)
                    .await?
                    .ok_or_else(|| ApiError::not_found(format!("{} not found", target.label())))?;

                if target.is_tenant_scoped() {
                    let owner = found.get("school_id").and_then(|v| match v {
                        Value::String(s) => Some(s.as_str()),
                        Value::Object(o) => o.get("_id").and_then(Value::as_str),
                        _ => None,
                    });
                    if owner != record.school_id() {
                        warn!("{} {} belongs to another school", target.label(), id);
                        return Err(ApiError::bad_request(format!(
                            "{} does not belong to this school",
                            target.label()
                        )));
                    }
                }
                related.insert(field, found);
            }
            Invariant::Check(check) => check(record, &related)?,
        }
    }

    Ok(())
}

fn exclude(filter: Filter, own_id: Option<&str>) -> Filter {
    match own_id {
        Some(id) => filter.ne("_id", id),
        None => filter,
    }
}
