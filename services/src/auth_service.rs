use crate::error::ServiceError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use db::models::user::{self, Model, Subscription};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use serde::{Deserialize, Serialize};
use util::config::AppConfig;

/// JWT claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub exp: usize,
    /// Unique per issue, so two logins in the same second get distinct tokens.
    pub jti: String,
}

/// Signing secret and lifetime for session tokens.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub duration_minutes: i64,
}

impl TokenSettings {
    pub fn from_config() -> Self {
        let cfg = AppConfig::global();
        Self {
            secret: cfg.jwt_secret.clone(),
            duration_minutes: cfg.jwt_duration_minutes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub subscription: Option<Subscription>,
}

/// What the resend-verification flow needs to know about an address.
///
/// An unknown address and an already verified one both yield
/// `verification_token: None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationState {
    pub verification_token: Option<String>,
    pub name: Option<String>,
}

/// Account service: credential storage and verification, session tokens,
/// subscription tiers and email verification tokens.
#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    tokens: TokenSettings,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, tokens: TokenSettings) -> Self {
        Self { db, tokens }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Model>, ServiceError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(Self::normalize_email(email)))
            .one(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Model>, ServiceError> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn exists(&self, email: &str) -> Result<bool, ServiceError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    /// Creates an unverified account with a fresh verification token.
    pub async fn create(&self, params: CreateUser) -> Result<Model, ServiceError> {
        let email = Self::normalize_email(&params.email);
        let name = params
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        let now = Utc::now();

        let active = user::ActiveModel {
            name: Set(name),
            avatar_url: Set(gravatar_url(&email)),
            email: Set(email),
            password_hash: Set(hash_password(&params.password)?),
            subscription: Set(params.subscription.unwrap_or_default()),
            token: Set(None),
            verify: Set(false),
            verification_token: Set(Some(uuid::Uuid::new_v4().simple().to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = active.insert(&self.db).await?;
        tracing::info!(user_id = created.id, "Account created");
        Ok(created)
    }

    /// Finds the account and checks the password in one step.
    ///
    /// `Ok(None)` covers both an unknown email and a wrong password.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Model>, ServiceError> {
        match self.find_by_email(email).await? {
            Some(user) if verify_password(&user, password) => Ok(Some(user)),
            _ => Ok(None),
        }
    }

    pub fn issue_token(&self, user: &Model) -> Result<String, ServiceError> {
        let expiry = Utc::now() + Duration::minutes(self.tokens.duration_minutes);
        let claims = Claims {
            sub: user.id,
            exp: expiry.timestamp() as usize,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.tokens.secret.as_bytes()),
        )?)
    }

    pub fn decode_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.tokens.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }

    /// Persists `token` as the user's current session; `None` ends the session.
    pub async fn store_token(&self, user_id: i64, token: Option<String>) -> Result<(), ServiceError> {
        user::Entity::update_many()
            .col_expr(user::Column::Token, Expr::value(token))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Resolves a bearer token to its user, provided it is still the
    /// session stored for that user.
    pub async fn find_by_session(&self, token: &str) -> Result<Option<Model>, ServiceError> {
        let claims = match self.decode_token(token) {
            Ok(claims) => claims,
            Err(_) => return Ok(None),
        };

        Ok(self
            .find_by_id(claims.sub)
            .await?
            .filter(|user| user.token.as_deref() == Some(token)))
    }

    pub async fn update_subscription(
        &self,
        id: i64,
        subscription: Subscription,
    ) -> Result<Model, ServiceError> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {id}")))?;

        let mut active = user.into_active_model();
        active.subscription = Set(subscription);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&self.db).await?)
    }

    pub async fn update_avatar(&self, user_id: i64, avatar_url: &str) -> Result<(), ServiceError> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::AvatarUrl, Expr::value(avatar_url))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("user {user_id}")));
        }
        Ok(())
    }

    /// Completes email verification for `token`.
    ///
    /// Returns `false` when no pending verification carries that token,
    /// including tokens that were already used.
    pub async fn is_token_verified(&self, token: &str) -> Result<bool, ServiceError> {
        let Some(user) = user::Entity::find()
            .filter(user::Column::VerificationToken.eq(token))
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };

        let mut active = user.into_active_model();
        active.verify = Set(true);
        active.verification_token = Set(None);
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;
        Ok(true)
    }

    pub async fn get_verification_state(
        &self,
        email: &str,
    ) -> Result<VerificationState, ServiceError> {
        Ok(match self.find_by_email(email).await? {
            Some(user) if !user.verify => VerificationState {
                verification_token: user.verification_token,
                name: Some(user.name),
            },
            Some(user) => VerificationState {
                verification_token: None,
                name: Some(user.name),
            },
            None => VerificationState::default(),
        })
    }
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::PasswordHash(e.to_string()))
}

pub fn verify_password(user: &Model, password: &str) -> bool {
    let parsed = match PasswordHash::new(&user.password_hash) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Default avatar: an identicon keyed by the email's md5.
pub fn gravatar_url(email: &str) -> String {
    let digest = md5::compute(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}?s=250&d=identicon", digest)
}
