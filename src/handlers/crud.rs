// Generic controller: one handler per verb, shared by every resource.
//
// POST   /api/v1/<resource>/      create
// GET    /api/v1/<resource>/      list      (body: { school_id })
// GET    /api/v1/<resource>/:id   get one   (body: { school_id })
// PUT    /api/v1/<resource>/:id   replace
// DELETE /api/v1/<resource>/:id   delete    (body: { school_id })

use axum::extract::State;
use serde_json::Value;
use tracing::info;

use super::invariants::enforce;
use crate::database::{Filter, ResourceService};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Payload, TenantScope, Validated};
use crate::resources::Resource;
use crate::state::AppState;
use crate::validation::Document;

fn to_document<R: Resource>(record: &R) -> Result<Document, ApiError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::internal("record did not serialize to an object")),
    }
}


/// POST /api/v1/<resource>/
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    validated: Validated<Payload<R>>,
) -> ApiResult {
    let Payload(mut record) = validated.request;
    let label = R::COLLECTION.label();

    let doc = to_document(&record)?;
    enforce::<R>(&state.store, &record, &doc, None).await?;

    record.prepare()?;
    let created = ResourceService::of::<R>(state.store.clone(), record.school_id())?
        .insert(to_document(&record)?, record.unique_key())
        .await?;

    let id = created.get("_id").and_then(Value::as_str).unwrap_or_default();
    info!("Created {} {}", R::COLLECTION.name(), id);
    Ok(ApiResponse::created(format!("{} created", label)).with_payload(Value::Object(created)))
}

/// GET /api/v1/<resource>/
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    validated: Validated<TenantScope<R>>,
) -> ApiResult {
    let records = ResourceService::of::<R>(state.store.clone(), validated.request.school_id())?
        .find_all_by_tenant()
        .await?;

    if records.is_empty() {
        return Err(ApiError::not_found(format!("No {} found", R::COLLECTION.plural())));
    }
    Ok(ApiResponse::payload(Value::Array(
        records.into_iter().map(Value::Object).collect(),
    )))
}

/// GET /api/v1/<resource>/:id
pub async fn get<R: Resource>(
    State(state): State<AppState>,
    validated: Validated<TenantScope<R>>,
) -> ApiResult {
    let id = validated.require_id()?;
    let record = ResourceService::of::<R>(state.store.clone(), validated.request.school_id())?
        .find_one_by_property(&Filter::by_id(id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} not found", R::COLLECTION.label())))?;

    Ok(ApiResponse::payload(Value::Object(record)))
}

/// PUT /api/v1/<resource>/:id - whole-record replace
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    validated: Validated<Payload<R>>,
) -> ApiResult {
    let id = validated.require_id()?.to_string();
    let Payload(mut record) = validated.request;
    let label = R::COLLECTION.label();

    let doc = to_document(&record)?;
    enforce::<R>(&state.store, &record, &doc, Some(&id)).await?;

    record.prepare()?;
    let updated = ResourceService::of::<R>(state.store.clone(), record.school_id())?
        .update_one_by_filter(&Filter::by_id(&id), to_document(&record)?, record.unique_key())
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} not updated", label)))?;

    info!("Updated {} {}", R::COLLECTION.name(), id);
    Ok(ApiResponse::message(format!("{} updated", label)).with_payload(Value::Object(updated)))
}

/// DELETE /api/v1/<resource>/:id
pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    validated: Validated<TenantScope<R>>,
) -> ApiResult {
    let id = validated.require_id()?;
    let label = R::COLLECTION.label();
    ResourceService::of::<R>(state.store.clone(), validated.request.school_id())?
        .delete_one_by_filter(&Filter::by_id(id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} not deleted", label)))?;

    info!("Deleted {} {}", R::COLLECTION.name(), id);
    Ok(ApiResponse::message(format!("{} deleted", label)))
}
