//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables (and a `.env`
//! file when present). Tests override individual fields through the setters.

use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock, RwLockReadGuard};
use strum::{Display, EnumString};

/// Deployment environment the server runs in.
///
/// Passed explicitly into services that change behaviour per environment
/// (e.g. email templates), never read from global state inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub project_name: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub jwt_secret: String,
    pub jwt_duration_minutes: i64,
    /// Externally reachable base URL, used for links inside emails.
    pub public_url: String,
    pub avatar_storage_root: String,
    pub sendgrid_api_key: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub email_from: String,
    pub email_from_name: String,
}

static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Unparseable config value, using default");
            default
        }),
        Err(_) => default,
    }
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every field has a development default so the server and the test
    /// suite start without any environment set up.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let port = parsed_or("PORT", 3000u16);

        Self {
            env: parsed_or("APP_ENV", Environment::Development),
            project_name: var_or("PROJECT_NAME", "users-api"),
            host: var_or("HOST", "127.0.0.1"),
            port,
            log_level: var_or("LOG_LEVEL", "api=info,services=info"),
            log_file: var_or("LOG_FILE", "api.log"),
            log_to_stdout: var_or("LOG_TO_STDOUT", "true") == "true",
            database_path: var_or("DATABASE_PATH", "data/users.db"),
            jwt_secret: var_or("JWT_SECRET", "dev-secret-change-me"),
            jwt_duration_minutes: parsed_or("JWT_DURATION_MINUTES", 60),
            public_url: var_or("PUBLIC_URL", &format!("http://localhost:{port}")),
            avatar_storage_root: var_or("AVATAR_STORAGE_ROOT", "public/avatars"),
            sendgrid_api_key: env::var("SENDGRID_API_KEY").unwrap_or_default(),
            smtp_host: var_or("SMTP_HOST", "localhost"),
            smtp_port: parsed_or("SMTP_PORT", 587),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            email_from: var_or("EMAIL_FROM", "no-reply@localhost"),
            email_from_name: var_or("EMAIL_FROM_NAME", "Users API"),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    pub fn set_env(value: Environment) {
        AppConfig::set_field(|cfg| cfg.env = value);
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_jwt_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.jwt_secret = value.into());
    }

    pub fn set_jwt_duration_minutes(value: i64) {
        AppConfig::set_field(|cfg| cfg.jwt_duration_minutes = value);
    }

    pub fn set_public_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.public_url = value.into());
    }

    pub fn set_avatar_storage_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.avatar_storage_root = value.into());
    }
}

// --- Free-function accessors used by the server binary ---

pub fn env() -> Environment {
    AppConfig::global().env
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn avatar_storage_root() -> String {
    AppConfig::global().avatar_storage_root.clone()
}
