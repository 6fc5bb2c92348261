use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents an account in the `users` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, used in outgoing emails.
    pub name: String,
    /// Unique, lower-cased email address used to log in.
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub subscription: Subscription,
    /// Current session token. `None` means no active session.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub avatar_url: String,
    /// Whether the email address has been confirmed.
    pub verify: bool,
    /// Pending email verification token; cleared once used.
    #[serde(skip_serializing)]
    #[sea_orm(unique)]
    pub verification_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscription tier of an account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Display, EnumString,
    Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Subscription {
    #[default]
    #[sea_orm(string_value = "starter")]
    Starter,

    #[sea_orm(string_value = "pro")]
    Pro,

    #[sea_orm(string_value = "business")]
    Business,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the account still waits for email confirmation.
    pub fn is_pending_verification(&self) -> bool {
        !self.verify && self.verification_token.is_some()
    }
}
