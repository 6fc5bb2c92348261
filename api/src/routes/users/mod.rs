//! # Users Routes Module
//!
//! Wires up the `/api/users` endpoint group.
//!
//! ## Structure
//! - `post.rs`: signup, login, logout, resend verification
//! - `get.rs`: current user, verify email
//! - `patch.rs`: subscription tier, avatar upload
//! - `common.rs`: request/response payloads shared between handlers
//!
//! ## Authentication
//! Handlers that need an account take the [`CurrentUser`](crate::auth::CurrentUser)
//! extractor, which answers `401 Not authorized` on its own.

use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use get::{get_current, verify_user};
use patch::{update_subscription, upload_avatar};
use post::{login, logout, registration, resend_verification_email};

pub mod common;
pub mod get;
pub mod patch;
pub mod post;

/// Upper bound on an avatar upload body.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Builds the `/users` route group.
///
/// - `POST /users/signup` → `registration`
/// - `POST /users/login` → `login`
/// - `POST /users/logout` → `logout` (authenticated)
/// - `GET /users/current` → `get_current` (authenticated)
/// - `PATCH /users` → `update_subscription` (authenticated)
/// - `PATCH /users/avatars` → `upload_avatar` (authenticated)
/// - `GET /users/verify/{verification_token}` → `verify_user`
/// - `POST /users/verify` → `resend_verification_email`
pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(registration))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/current", get(get_current))
        .route("/", patch(update_subscription))
        .route(
            "/avatars",
            patch(upload_avatar).layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES)),
        )
        .route("/verify/{verification_token}", get(verify_user))
        .route("/verify", post(resend_verification_email))
}
