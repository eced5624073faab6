//! API error types mapped to HTTP status codes.
//!
//! Every variant renders as a JSON body `{"error": "message"}`; invalid
//! filters additionally carry `invalid_keys`.

use crate::errors::StoreError;
use crate::logger::AUDIT_TARGET;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed request, bad geometry, empty patch (400).
    BadRequest(String),
    /// Filter keys no feature carries (400).
    InvalidFilter(Vec<String>),
    /// Unknown spot id (404).
    NotFound(String),
    /// No route for this path (404).
    RouteNotFound(String),
    /// A spot already exists at this position (409).
    Conflict(String),
    /// Mutation lock not acquired in time (503).
    ServiceUnavailable(String),
    /// Storage failure (500).
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Translate a store failure for operation `op`, logging server-side
    /// problems where operators will see them.
    #[must_use]
    pub fn from_store(op: &str, err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::InvalidFilter(keys) => Self::InvalidFilter(keys),
            StoreError::RepeatedFilter(_)
            | StoreError::InvalidGeometry(_)
            | StoreError::NoUpdatableFields => {
                log::debug!("{op}: rejected: {message}");
                Self::BadRequest(message)
            }
            StoreError::NotFound(_) => Self::NotFound(message),
            StoreError::DuplicateId(_) => Self::Conflict(message),
            StoreError::Busy(_) => {
                log::warn!("{op}: {message}");
                Self::ServiceUnavailable(message)
            }
            StoreError::Persist(_) | StoreError::Corrupt(_) | StoreError::Io(_) | StoreError::Json(_) => {
                log::error!(target: AUDIT_TARGET, "{op} failed: {message}");
                Self::Internal(message)
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::from_store("request", err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::InvalidFilter(keys) => json!({
                "error": format!("invalid filters: {}", keys.join(", ")),
                "invalid_keys": keys,
            }),
            Self::RouteNotFound(path) => json!({
                "error": "endpoint not found",
                "path": path,
                "suggestion": "check the URL; parking spots are served under /api/parcheggi",
            }),
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::ServiceUnavailable(msg)
            | Self::Internal(msg) => json!({ "error": msg }),
        };
        (status, axum::Json(body)).into_response()
    }
}
