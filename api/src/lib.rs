//! HTTP layer of the users service.
//!
//! Handlers live in [`routes::users`]; every response goes through
//! [`response::ApiResponse`] and every propagated failure through
//! [`error::AppError`].

pub mod auth;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;
pub mod validation;
