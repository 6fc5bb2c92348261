use crate::response::ApiResponse;
use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::ServiceError;
use thiserror::Error;

/// Every failure a handler can propagate with `?`.
///
/// Rendered as `{ "status": "error", "code": <code>, "message": <reason> }`.
/// Unexpected failures are logged here and answered with a generic 500 so
/// internals never reach the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("invalid JSON body: {0}")]
    Json(#[from] JsonRejection),

    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl AppError {
    pub fn unauthorized() -> Self {
        AppError::Unauthorized("Not authorized".into())
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Json(rejection) => (client_error(rejection.status()), rejection.body_text()),
            AppError::Multipart(err) => (client_error(err.status()), err.body_text()),
            AppError::Service(ServiceError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Service(err @ ServiceError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            AppError::Service(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

/// Body extraction failures are the client's fault: an oversized body keeps
/// its 413, anything else is a plain 400.
fn client_error(status: StatusCode) -> StatusCode {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        status
    } else {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = self.status_and_message();

        if code.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(code = code.as_u16(), error = %self, "Request rejected");
        }

        ApiResponse::<()>::error(code, message).into_response()
    }
}
