use db::models::user::{Model as User, Subscription};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be between 1 and 64 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub subscription: Option<Subscription>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubscriptionRequest {
    pub id: i64,
    pub subscription: Subscription,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResendVerificationRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Registration payload. Carries no token of any kind.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subscription: Subscription,
    pub avatar_url: String,
    pub is_send_verification: bool,
}

impl RegisterResponse {
    pub fn new(user: User, is_send_verification: bool) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            subscription: user.subscription,
            avatar_url: user.avatar_url,
            is_send_verification,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub email: String,
    pub subscription: Subscription,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            subscription: user.subscription,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subscription: Subscription,
}

impl From<User> for SubscriptionResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            subscription: user.subscription,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResponse {
    pub avatar_url: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendResponse {
    pub message: String,
    pub is_send_verification: bool,
}
