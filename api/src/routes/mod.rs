//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → Health check endpoint (public)
//! - `/users` → Account endpoints: signup, login, session, subscription,
//!   avatar and email verification
//!
//! Stored avatars are served outside `/api`, under [`AVATAR_URL_PREFIX`].

use crate::auth::middleware::log_request;
use crate::routes::{health::health_routes, users::users_routes};
use crate::state::{AVATAR_URL_PREFIX, AppState};
use axum::{Router, middleware::from_fn};
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, services::ServeDir};

pub mod health;
pub mod users;

/// Builds the `/api` router with `app_state` applied.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/users", users_routes())
        .with_state(app_state)
}

/// Full application: API routes, static avatars from `avatar_root`, request
/// logging and CORS.
pub fn build_app(app_state: AppState, avatar_root: PathBuf) -> Router {
    Router::new()
        .nest("/api", routes(app_state))
        .nest_service(AVATAR_URL_PREFIX, ServeDir::new(avatar_root))
        .layer(from_fn(log_request))
        .layer(CorsLayer::very_permissive())
}
