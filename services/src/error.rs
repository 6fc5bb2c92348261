use sea_orm::DbErr;
use thiserror::Error;

/// Failures raised by the account and storage services.
///
/// These are unexpected from a handler's point of view and are forwarded
/// unchanged to the HTTP error boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}
