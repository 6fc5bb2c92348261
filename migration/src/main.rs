use std::{fs, path::Path};
use util::{config, paths};

mod runner;

/// Migration CLI.
///
/// - `migration`        apply all migrations
/// - `migration fresh`  drop the database file and stored avatars, then migrate
/// - `migration clean`  drop the database file and stored avatars only
#[tokio::main]
async fn main() {
    let db_path = config::database_path();
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("clean") => {
            remove_db_file(&db_path);
            remove_avatars();
        }
        Some("fresh") => {
            remove_db_file(&db_path);
            remove_avatars();
            runner::run_all_migrations(&database_url(&db_path)).await;
        }
        _ => {
            runner::run_all_migrations(&database_url(&db_path)).await;
        }
    }
}

/// Same resolution of `DATABASE_PATH` as the server uses.
fn database_url(db_path: &str) -> String {
    paths::sqlite_url(db_path).expect("Failed to create DB directory")
}

fn remove_db_file(path: &str) {
    if path.starts_with("sqlite:") {
        println!("DATABASE_PATH is a connection string, not deleting: {path}");
        return;
    }

    let db_path = Path::new(path);
    if db_path.exists() {
        fs::remove_file(db_path).expect("Failed to delete DB file");
        println!("Deleted DB: {}", db_path.display());
    } else {
        println!("DB file does not exist: {}", db_path.display());
    }
}

fn remove_avatars() {
    let root = paths::avatar_storage_root();
    if root.exists() {
        fs::remove_dir_all(&root).expect("Failed to delete stored avatars");
        println!("Deleted avatars: {}", root.display());
    }
}
