//! Collaborators behind the users HTTP API.
//!
//! - [`auth_service`]: accounts, credentials, session and verification tokens.
//! - [`email`]: templated transactional email over pluggable delivery backends.
//! - [`storage`]: avatar persistence over pluggable storage backends.

pub mod auth_service;
pub mod email;
pub mod error;
pub mod storage;

pub use error::ServiceError;
