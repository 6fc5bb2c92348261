use super::common::{AvatarResponse, SubscriptionResponse, UpdateSubscriptionRequest};
use crate::{
    auth::CurrentUser, error::AppError, response::ApiResponse, state::AppState,
    validation::ValidatedJson,
};
use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
};
use services::storage::{AvatarFile, UploadFileService};

/// PATCH /api/users
///
/// Change the subscription tier of the caller's own account.
///
/// ### Request Body
/// ```json
/// { "id": 1, "subscription": "pro" }
/// ```
///
/// ### Responses
/// - `200 OK`
/// ```json
/// {
///   "status": "success",
///   "code": 200,
///   "data": { "id": 1, "name": "Ada", "email": "ada@example.com", "subscription": "pro" }
/// }
/// ```
/// - `400 Bad Request` (unknown tier or malformed body)
/// - `401 Unauthorized`
/// - `403 Forbidden` when `id` is not the caller's
/// - `404 Not Found`
pub async fn update_subscription(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ValidatedJson(req): ValidatedJson<UpdateSubscriptionRequest>,
) -> Result<ApiResponse<SubscriptionResponse>, AppError> {
    if req.id != caller.id {
        return Ok(ApiResponse::error(
            StatusCode::FORBIDDEN,
            "Not allowed to change another user's subscription",
        ));
    }

    let user = state
        .auth()
        .update_subscription(req.id, req.subscription)
        .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        SubscriptionResponse::from(user),
    ))
}

/// PATCH /api/users/avatars
///
/// Replace the caller's avatar.
///
/// ### Request (multipart/form-data)
/// - `avatar` (required): the image file. Accepted: PNG, JPEG, GIF, WebP, BMP.
///
/// ### Responses
/// - `200 OK`
/// ```json
/// { "status": "success", "code": 200, "data": { "avatarUrl": "/avatars/1/avatar_1700000000000.png" } }
/// ```
/// - `400 Bad Request` (`Avatar file is required`, `File type not supported`)
/// - `401 Unauthorized`
pub async fn upload_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<AvatarResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let mut avatar = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("avatar") {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await?;

        avatar = Some(AvatarFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let Some(file) = avatar else {
        return Ok(ApiResponse::error(
            StatusCode::BAD_REQUEST,
            "Avatar file is required",
        ));
    };

    let avatar_url = UploadFileService::new(state.avatars(), file, &user)
        .update_avatar(state.auth(), state.avatar_locks())
        .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        AvatarResponse { avatar_url },
    ))
}
