pub mod models;
pub mod test_utils;

use sea_orm::{Database, DatabaseConnection, DbErr};
use util::{config, paths};

/// Connects to the configured database.
///
/// `DATABASE_PATH` may be a full DSN (`sqlite:...`) or a plain SQLite file
/// path, in which case the parent directory is created first.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let path_or_url = config::database_path();
    let url = paths::sqlite_url(&path_or_url).map_err(|e| {
        DbErr::Custom(format!("cannot create database directory for {path_or_url}: {e}"))
    })?;

    tracing::debug!(%url, "Connecting to database");
    Database::connect(&url).await
}
