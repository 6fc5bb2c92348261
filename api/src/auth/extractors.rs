use crate::{error::AppError, state::AppState};
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::TypedHeader;
use db::models::user::Model as User;
use headers::{Authorization, authorization::Bearer};

/// The account behind the request's session token.
///
/// Reads the `Authorization: Bearer <token>` header and resolves it through
/// [`AuthService::find_by_session`](services::auth_service::AuthService::find_by_session).
/// The token must still be the one stored on the account, so a token is
/// rejected as soon as its owner logs out or logs in again.
///
/// # Errors
/// - `401 Not authorized` if the header is missing or malformed, the token
///   is invalid or expired, or it is no longer the account's active token.
///
/// # Example
/// ```ignore
/// async fn protected_route(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     // user is now available
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::unauthorized())?;

        let user = state
            .auth()
            .find_by_session(bearer.token())
            .await?
            .ok_or_else(AppError::unauthorized)?;

        Ok(CurrentUser(user))
    }
}
