use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer};

/// Outcome marker carried at the top level of every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// Every endpoint answers with the same envelope:
/// ```json
/// {
///   "status": "success",
///   "code": 200,
///   "data": { ... }
/// }
/// ```
///
/// - `status` is `"success"` or `"error"`.
/// - `code` mirrors the HTTP status line; the response status is always
///   derived from it, so the two cannot disagree.
/// - `data` is the payload, omitted when absent.
/// - `message` is a human-readable reason, omitted when absent.
///
/// ## Example (business rejection):
/// ```json
/// {
///   "status": "error",
///   "code": 409,
///   "message": "Email in use"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub status: Status,
    #[serde(serialize_with = "serialize_status_code")]
    pub code: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn serialize_status_code<S>(code: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(code.as_u16())
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Constructs a success response carrying `data`.
    pub fn success(code: StatusCode, data: T) -> Self {
        Self {
            status: Status::Success,
            code,
            data: Some(data),
            message: None,
        }
    }

    /// Constructs an error response with a message and no payload.
    pub fn error(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            code,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Constructs an error response whose reason travels inside `data`.
    pub fn error_with_data(code: StatusCode, data: T) -> Self {
        Self {
            status: Status::Error,
            code,
            data: Some(data),
            message: None,
        }
    }

    /// Constructs an error response that carries only `status` and `code`.
    pub fn bare_error(code: StatusCode) -> Self {
        Self {
            status: Status::Error,
            code,
            data: None,
            message: None,
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}
