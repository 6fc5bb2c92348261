use crate::config;
use std::{fs, io, path::{Path, PathBuf}};

/// Create a directory (and all parents) if it doesn't exist, and return the path.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let p = path.as_ref();
    fs::create_dir_all(p)?;
    Ok(p.to_path_buf())
}

/// Resolve a possibly relative directory against `current_dir()`.
pub fn absolute<P: AsRef<Path>>(path: P) -> PathBuf {
    let p = path.as_ref();
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p)
    }
}

/// SQLite connection URL for a `DATABASE_PATH` value.
///
/// A full DSN (`sqlite:...`) is returned unchanged. A plain file path gets its
/// parent directory created and becomes `sqlite://{path}?mode=rwc`.
pub fn sqlite_url(path_or_url: &str) -> io::Result<String> {
    if path_or_url.starts_with("sqlite:") {
        return Ok(path_or_url.to_string());
    }
    if let Some(parent) = Path::new(path_or_url).parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(format!("sqlite://{path_or_url}?mode=rwc"))
}

/// Avatar storage root (absolute), from `config::avatar_storage_root()`.
pub fn avatar_storage_root() -> PathBuf {
    absolute(config::avatar_storage_root())
}

/// A user's avatar folder under a given root: {root}/{user_id}
pub fn user_avatar_dir<P: AsRef<Path>>(root: P, user_id: i64) -> PathBuf {
    root.as_ref().join(user_id.to_string())
}

/// Build a path to an avatar file (does not create).
/// Example: user_avatar_path("/srv/avatars", 42, "avatar.png") → /srv/avatars/42/avatar.png
pub fn user_avatar_path<P: AsRef<Path>>(root: P, user_id: i64, filename: &str) -> PathBuf {
    user_avatar_dir(root, user_id).join(filename)
}
