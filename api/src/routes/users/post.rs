use super::common::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, ResendResponse,
    ResendVerificationRequest, UserSummary,
};
use crate::{
    auth::CurrentUser, error::AppError, response::ApiResponse, state::AppState,
    validation::ValidatedJson,
};
use axum::{extract::State, http::StatusCode};
use services::auth_service::{AuthService, CreateUser, VerificationState};

/// POST /api/users/signup
///
/// Register a new account and send it a verification email.
///
/// ### Request Body
/// ```json
/// {
///   "name": "Ada",
///   "email": "ada@example.com",
///   "password": "secret1",
///   "subscription": "starter"
/// }
/// ```
/// `name` defaults to the local part of the email, `subscription` to `starter`.
///
/// ### Responses
///
/// - `201 Created`
/// ```json
/// {
///   "status": "success",
///   "code": 201,
///   "data": {
///     "id": 1,
///     "name": "Ada",
///     "email": "ada@example.com",
///     "subscription": "starter",
///     "avatarUrl": "https://www.gravatar.com/avatar/...",
///     "isSendVerification": true
///   }
/// }
/// ```
/// `isSendVerification` is `false` when the email could not be delivered;
/// the account is created either way.
///
/// - `400 Bad Request` (validation failure)
/// - `409 Conflict`
/// ```json
/// { "status": "error", "code": 409, "message": "Email in use" }
/// ```
pub async fn registration(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<ApiResponse<RegisterResponse>, AppError> {
    let auth = state.auth();

    if auth.exists(&req.email).await? {
        return Ok(ApiResponse::error(StatusCode::CONFLICT, "Email in use"));
    }

    let user = auth
        .create(CreateUser {
            name: req.name,
            email: req.email,
            password: req.password,
            subscription: req.subscription,
        })
        .await?;

    let is_send_verification = match user.verification_token.as_deref() {
        Some(token) => {
            state
                .email_service(&state.mailers().transactional)
                .send_verify_email(&user.email, &user.name, token)
                .await
        }
        None => false,
    };

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        RegisterResponse::new(user, is_send_verification),
    ))
}

/// POST /api/users/login
///
/// Authenticate with email and password and start a new session. The issued
/// token replaces any previous one.
///
/// ### Request Body
/// ```json
/// { "email": "ada@example.com", "password": "secret1" }
/// ```
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "status": "success",
///   "code": 200,
///   "data": {
///     "token": "jwt_token_here",
///     "user": { "email": "ada@example.com", "subscription": "starter" }
///   }
/// }
/// ```
///
/// - `401 Unauthorized`
/// ```json
/// { "status": "error", "code": 401, "message": "Email or password is wrong" }
/// ```
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let auth = state.auth();

    let Some(user) = auth.authenticate(&req.email, &req.password).await? else {
        return Ok(ApiResponse::error(
            StatusCode::UNAUTHORIZED,
            "Email or password is wrong",
        ));
    };

    let token = auth.issue_token(&user)?;
    auth.store_token(user.id, Some(token.clone())).await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        LoginResponse {
            token,
            user: UserSummary::from(&user),
        },
    ))
}

/// POST /api/users/logout
///
/// Ends the caller's session. The bearer token stops working immediately.
///
/// ### Responses
/// - `204 No Content` (empty body)
/// - `401 Unauthorized`
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, AppError> {
    state.auth().store_token(user.id, None).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/verify
///
/// Resend the verification email over SMTP.
///
/// ### Request Body
/// ```json
/// { "email": "ada@example.com" }
/// ```
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "status": "success",
///   "code": 200,
///   "data": { "message": "Verification email sent", "isSendVerification": true }
/// }
/// ```
///
/// - `400 Bad Request` when the address is unknown or already verified. The
///   two cases are indistinguishable to the client.
/// ```json
/// { "status": "error", "code": 400 }
/// ```
pub async fn resend_verification_email(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ResendVerificationRequest>,
) -> Result<ApiResponse<ResendResponse>, AppError> {
    let VerificationState {
        verification_token,
        name,
    } = state.auth().get_verification_state(&req.email).await?;

    let Some(token) = verification_token else {
        return Ok(ApiResponse::bare_error(StatusCode::BAD_REQUEST));
    };

    let email = AuthService::normalize_email(&req.email);
    let is_send_verification = state
        .email_service(&state.mailers().relay)
        .send_verify_email(&email, name.as_deref().unwrap_or_default(), &token)
        .await;

    Ok(ApiResponse::success(
        StatusCode::OK,
        ResendResponse {
            message: "Verification email sent".into(),
            is_send_verification,
        },
    ))
}
