use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::Value;

/// Success envelope: `{ msg?, payload?, success: true }`
#[derive(Debug, Serialize)]
struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
    success: bool,
}

/// Successful API response, wrapped in the success envelope on the way out
#[derive(Debug)]
pub struct ApiResponse {
    pub msg: Option<String>,
    pub payload: Option<Value>,
    pub status_code: StatusCode,
}

impl ApiResponse {
    /// 200 with a message only
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            msg: Some(msg.into()),
            payload: None,
            status_code: StatusCode::OK,
        }
    }

    /// 200 with a payload only
    pub fn payload(payload: impl Into<Value>) -> Self {
        Self {
            msg: None,
            payload: Some(payload.into()),
            status_code: StatusCode::OK,
        }
    }

    /// 201 Created with a message
    pub fn created(msg: impl Into<String>) -> Self {
        Self::message(msg).with_status(StatusCode::CREATED)
    }

    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let envelope = Envelope {
            msg: self.msg,
            payload: self.payload,
            success: true,
        };
        (self.status_code, Json(envelope)).into_response()
    }
}

// Convenience type alias
pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;
