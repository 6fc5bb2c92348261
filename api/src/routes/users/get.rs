use super::common::{MessageResponse, UserSummary};
use crate::{auth::CurrentUser, error::AppError, response::ApiResponse, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
};

/// GET /api/users/current
///
/// ### Responses
/// - `200 OK`
/// ```json
/// {
///   "status": "success",
///   "code": 200,
///   "data": { "email": "ada@example.com", "subscription": "starter" }
/// }
/// ```
/// - `401 Unauthorized`
pub async fn get_current(CurrentUser(user): CurrentUser) -> ApiResponse<UserSummary> {
    ApiResponse::success(StatusCode::OK, UserSummary::from(&user))
}

/// GET /api/users/verify/{verification_token}
///
/// Confirms the email address the token was sent to. A token works once.
///
/// ### Responses
/// - `200 OK`
/// ```json
/// { "status": "success", "code": 200, "data": { "message": "email verified successful" } }
/// ```
/// - `400 Bad Request`
/// ```json
/// { "status": "error", "code": 400, "data": { "message": "Invalid token" } }
/// ```
pub async fn verify_user(
    State(state): State<AppState>,
    Path(verification_token): Path<String>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    if state.auth().is_token_verified(&verification_token).await? {
        return Ok(ApiResponse::success(
            StatusCode::OK,
            MessageResponse::new("email verified successful"),
        ));
    }

    Ok(ApiResponse::error_with_data(
        StatusCode::BAD_REQUEST,
        MessageResponse::new("Invalid token"),
    ))
}
