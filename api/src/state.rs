use sea_orm::DatabaseConnection;
use services::{
    auth_service::{AuthService, TokenSettings},
    email::{EmailError, EmailSender, EmailService, SendGridSender, SmtpSender},
    storage::{AvatarLocks, LocalFileStorage, StorageBackend},
};
use std::sync::Arc;
use util::{
    config::{AppConfig, Environment},
    paths,
};

/// Public URL prefix under which stored avatars are served.
pub const AVATAR_URL_PREFIX: &str = "/avatars";

/// Email delivery backends, picked per call site.
#[derive(Clone)]
pub struct Mailers {
    /// Transactional HTTP API, used on registration.
    pub transactional: Arc<dyn EmailSender>,
    /// SMTP relay, used when resending verification.
    pub relay: Arc<dyn EmailSender>,
}

/// Shared state handed to every handler.
///
/// Cheap to clone: the connection pool and the backends are reference counted.
#[derive(Clone)]
pub struct AppState {
    auth: AuthService,
    env: Environment,
    public_url: String,
    mailers: Mailers,
    avatars: Arc<dyn StorageBackend>,
    avatar_locks: AvatarLocks,
}

impl AppState {
    pub fn new(
        auth: AuthService,
        env: Environment,
        public_url: impl Into<String>,
        mailers: Mailers,
        avatars: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            auth,
            env,
            public_url: public_url.into(),
            mailers,
            avatars,
            avatar_locks: AvatarLocks::default(),
        }
    }

    /// Wires the production backends from the global configuration.
    pub fn from_config(db: DatabaseConnection) -> Result<Self, EmailError> {
        let (env, public_url) = {
            let cfg = AppConfig::global();
            (cfg.env, cfg.public_url.clone())
        };

        let mailers = Mailers {
            transactional: Arc::new(SendGridSender::from_config()),
            relay: Arc::new(SmtpSender::from_config()?),
        };
        let avatars = Arc::new(LocalFileStorage::new(
            paths::avatar_storage_root(),
            AVATAR_URL_PREFIX,
        ));

        Ok(Self::new(
            AuthService::new(db, TokenSettings::from_config()),
            env,
            public_url,
            mailers,
            avatars,
        ))
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn env(&self) -> Environment {
        self.env
    }

    pub fn mailers(&self) -> &Mailers {
        &self.mailers
    }

    pub fn avatars(&self) -> Arc<dyn StorageBackend> {
        Arc::clone(&self.avatars)
    }

    pub fn avatar_locks(&self) -> &AvatarLocks {
        &self.avatar_locks
    }

    /// Email service bound to this deployment's environment and `sender`.
    pub fn email_service(&self, sender: &Arc<dyn EmailSender>) -> EmailService {
        EmailService::new(self.env, self.public_url.clone(), Arc::clone(sender))
    }
}
