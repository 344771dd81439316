use std::collections::HashMap;
use std::marker::PhantomData;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::StatusCode,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::resources::{school_rule, Resource};
use crate::validation::{self, Document, FieldError, FieldRule, Location};

/// Typed request contract: the field rules a body must pass and how the
/// sanitized body becomes the typed request
pub trait RequestSchema: Sized + Send {
    fn rules() -> Vec<FieldRule>;
    fn from_body(body: Document) -> Result<Self, ApiError>;
}

/// Full record body for create and update
#[derive(Debug)]
pub struct Payload<R>(pub R);

impl<R: Resource> RequestSchema for Payload<R> {
    fn rules() -> Vec<FieldRule> {
        R::rules()
    }

    fn from_body(body: Document) -> Result<Self, ApiError> {
        serde_json::from_value(Value::Object(body))
            .map(Payload)
            .map_err(|e| ApiError::bad_request(e.to_string()))
    }
}

/// `{ school_id }` body used by list, get-one and delete
#[derive(Debug)]
pub struct TenantScope<R> {
    pub school_id: Option<String>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> TenantScope<R> {
    pub fn school_id(&self) -> Option<&str> {
        self.school_id.as_deref()
    }
}

impl<R: Resource> RequestSchema for TenantScope<R> {
    fn rules() -> Vec<FieldRule> {
        if R::COLLECTION.is_tenant_scoped() {
            vec![school_rule()]
        } else {
            Vec::new()
        }
    }

    fn from_body(body: Document) -> Result<Self, ApiError> {
        let school_id = if R::COLLECTION.is_tenant_scoped() {
            body.get("school_id").and_then(Value::as_str).map(str::to_string)
        } else {
            None
        };
        Ok(Self {
            school_id,
            _resource: PhantomData,
        })
    }
}

/// A request that passed path and body validation
#[derive(Debug)]
pub struct Validated<T> {
    pub id: Option<String>,
    pub request: T,
}

impl<T> Validated<T> {
    /// The `:id` path parameter of item routes
    pub fn require_id(&self) -> Result<&str, ApiError> {
        self.id.as_deref().ok_or_else(|| {
            ApiError::Validation(vec![FieldError {
                location: Location::Params,
                msg: "id is required".to_string(),
                param: "id".to_string(),
                value: None,
            }])
        })
    }
}

/// Empty body reads as `{}`; anything other than a JSON object is malformed
fn parse_body(bytes: &[u8]) -> Result<Document, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) | Err(_) => Err(ApiError::InvalidJson),
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: RequestSchema,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let params = match Path::<HashMap<String, String>>::from_request_parts(&mut parts, state).await {
            Ok(Path(params)) => params,
            Err(_) => HashMap::new(),
        };
        let req = Request::from_parts(parts, body);

        let bytes = Bytes::from_request(req, state).await.map_err(|e| match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
            _ => ApiError::bad_request(e.body_text()),
        })?;
        let body = parse_body(&bytes)?;

        let params_doc: Document = params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let mut rules = Vec::new();
        if params_doc.contains_key("id") {
            rules.push(FieldRule::param("id").object_id());
        }
        rules.extend(T::rules());

        let sanitized = validation::validate(&rules, &params_doc, body).map_err(|errors| {
            tracing::debug!("Request rejected with {} field error(s)", errors.len());
            ApiError::Validation(errors)
        })?;

        Ok(Validated {
            id: sanitized.params.get("id").and_then(Value::as_str).map(str::to_string),
            request: T::from_body(sanitized.body)?,
        })
    }
}
