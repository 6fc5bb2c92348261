use super::{AvatarFile, StorageBackend};
use crate::error::ServiceError;
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use util::paths;

/// Filesystem backend: `{root}/{user_id}/avatar_{millis}.{ext}`, published
/// under `{public_prefix}/{user_id}/...`.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    public_prefix: String,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into(),
        }
    }

    /// File name behind a URL this backend published, if it is one.
    fn file_name_of<'u>(&self, user_id: i64, url: &'u str) -> Option<&'u str> {
        let prefix = format!("{}/{}/", self.public_prefix.trim_end_matches('/'), user_id);
        url.strip_prefix(&prefix).filter(|name| !name.contains('/'))
    }
}

#[async_trait]
impl StorageBackend for LocalFileStorage {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn save(&self, user_id: i64, file: &AvatarFile) -> Result<String, ServiceError> {
        let ext = file
            .extension()
            .ok_or_else(|| ServiceError::InvalidInput("File type not supported".into()))?;

        tokio::fs::create_dir_all(paths::user_avatar_dir(&self.root, user_id)).await?;

        let filename = format!("avatar_{}.{}", Utc::now().timestamp_millis(), ext);
        tokio::fs::write(paths::user_avatar_path(&self.root, user_id, &filename), &file.bytes).await?;

        Ok(format!(
            "{}/{}/{}",
            self.public_prefix.trim_end_matches('/'),
            user_id,
            filename
        ))
    }

    async fn prune(&self, user_id: i64, keep_url: &str) {
        let keep = self.file_name_of(user_id, keep_url);
        let Ok(mut entries) = tokio::fs::read_dir(paths::user_avatar_dir(&self.root, user_id)).await else {
            return;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            if keep.is_some_and(|name| entry.file_name() == name) {
                continue;
            }
            if let Err(e) = tokio::fs::remove_file(entry.path()).await {
                tracing::warn!(path = %entry.path().display(), error = %e, "Could not remove old avatar");
            }
        }
    }

    async fn discard(&self, user_id: i64, url: &str) {
        let Some(name) = self.file_name_of(user_id, url) else {
            return;
        };
        let path = paths::user_avatar_path(&self.root, user_id, name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "Could not discard avatar");
        }
    }
}
