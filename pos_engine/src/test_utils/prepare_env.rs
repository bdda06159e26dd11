use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

use crate::{PosDatabase, SqliteDatabase};

/// Drops and recreates the database at `url`, runs the migrations and returns a connected backend. Logging is
/// configured from `.env.test` the first time any test calls this.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    debug!("🚀️ Test database ready at {}", db.url());
    db
}

/// A unique database path per test, so suites can run in parallel against their own files.
pub fn random_db_path() -> String {
    format!("sqlite://../data/test_pos_{}", rand::random::<u64>())
}
