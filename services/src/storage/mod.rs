//! Avatar storage.
//!
//! [`UploadFileService`] stores an uploaded avatar through a
//! [`StorageBackend`] and records the resulting public URL on the account.
//! Backends are chosen by the caller; [`local::LocalFileStorage`] writes to
//! the filesystem and is served statically by the API.

pub mod local;

use crate::{auth_service::AuthService, error::ServiceError};
use async_trait::async_trait;
use db::models::user::Model as User;
use mime_guess::mime::{self, Mime};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub use local::LocalFileStorage;

/// An uploaded file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct AvatarFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AvatarFile {
    /// Image type of the upload: the declared content type when it is an
    /// image, otherwise a guess from the file name.
    fn image_mime(&self) -> Option<Mime> {
        let declared = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.parse::<Mime>().ok())
            .filter(|m| m.type_() == mime::IMAGE);

        declared.or_else(|| {
            self.file_name
                .as_deref()
                .and_then(|name| mime_guess::from_path(name).first())
                .filter(|m| m.type_() == mime::IMAGE)
        })
    }

    /// File extension to store the avatar under, `None` for unsupported types.
    pub fn extension(&self) -> Option<&'static str> {
        match self.image_mime()?.essence_str() {
            "image/png" => Some("png"),
            "image/jpeg" => Some("jpg"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            "image/bmp" => Some("bmp"),
            _ => None,
        }
    }
}

/// Storage backend capability.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Stores `file` as a new avatar of `user_id` and returns its public URL.
    /// Previously stored avatars are left in place.
    async fn save(&self, user_id: i64, file: &AvatarFile) -> Result<String, ServiceError>;

    /// Removes every stored avatar of `user_id` except the one at `keep_url`.
    async fn prune(&self, user_id: i64, keep_url: &str);

    /// Removes the avatar at `url`. Best effort.
    async fn discard(&self, user_id: i64, url: &str);
}

/// Serializes avatar replacement per user, so the URL stored on the account
/// always names a file that still exists.
#[derive(Clone, Default)]
pub struct AvatarLocks {
    inner: Arc<Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>>,
}

impl AvatarLocks {
    pub async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(user_id).or_default())
        };
        lock.lock_owned().await
    }
}

pub struct UploadFileService<'a> {
    backend: Arc<dyn StorageBackend>,
    file: AvatarFile,
    user: &'a User,
}

impl<'a> UploadFileService<'a> {
    pub fn new(backend: Arc<dyn StorageBackend>, file: AvatarFile, user: &'a User) -> Self {
        Self {
            backend,
            file,
            user,
        }
    }

    /// Stores the file, points the user's avatar at it, then removes the
    /// avatars it replaces. If the account cannot be updated the new file is
    /// discarded and the previous avatar stays untouched.
    pub async fn update_avatar(
        &self,
        accounts: &AuthService,
        locks: &AvatarLocks,
    ) -> Result<String, ServiceError> {
        if self.file.bytes.is_empty() {
            return Err(ServiceError::InvalidInput("Avatar file is empty".into()));
        }
        if self.file.extension().is_none() {
            return Err(ServiceError::InvalidInput("File type not supported".into()));
        }

        let _guard = locks.acquire(self.user.id).await;

        let url = self.backend.save(self.user.id, &self.file).await?;
        if let Err(e) = accounts.update_avatar(self.user.id, &url).await {
            self.backend.discard(self.user.id, &url).await;
            return Err(e);
        }
        self.backend.prune(self.user.id, &url).await;

        tracing::info!(user_id = self.user.id, backend = self.backend.name(), %url, "Avatar updated");
        Ok(url)
    }
}
