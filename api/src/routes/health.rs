use crate::{response::ApiResponse, state::AppState};
use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};

/// Builds the `/health` route group.
///
/// A single `GET /health` endpoint for uptime checks and load balancer probes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// GET /api/health
///
/// ### Response
/// - `200 OK`
///
/// ```json
/// {
///   "status": "success",
///   "code": 200,
///   "data": "OK"
/// }
/// ```
async fn health_check() -> impl IntoResponse {
    ApiResponse::success(StatusCode::OK, "OK")
}
