//! Uniform response envelope.
//!
//! Every route answers with `{status, payload}`: `payload` is an array for
//! collection endpoints and an object for single resources. Clients depend
//! on this shape, so handlers never hand raw values to axum. Creation
//! responses additionally expose the new record's id as a top-level `_id`
//! field, which existing clients read without unwrapping the payload.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// The `status` discriminant of every response body.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// A successful `{status, payload}` response (HTTP 200).
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Wrap a payload in a success envelope.
    pub const fn success(payload: T) -> Self {
        Self {
            status: Status::Success,
            payload,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A creation response (HTTP 201) carrying a top-level `_id`.
#[derive(Debug, Serialize)]
pub struct Created<T> {
    pub status: Status,
    #[serde(rename = "_id")]
    pub id: String,
    pub payload: T,
}

impl<T> Created<T> {
    /// Wrap a freshly created record.
    pub fn new(id: impl ToString, payload: T) -> Self {
        Self {
            status: Status::Success,
            id: id.to_string(),
            payload,
        }
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

/// The `{status: "error", error}` body used by every failure response.
pub(crate) fn error_body(message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": Status::Error,
        "error": message,
    }))
}
