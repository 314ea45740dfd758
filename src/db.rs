//! Database connection bootstrap. One pool for the process lifetime.

use once_cell::sync::OnceCell;
use sea_orm::{Database, DatabaseConnection};

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

pub async fn init_db(url: String) {
    let pool = Database::connect(&url)
        .await
        .expect("Failed to connect to database.");
    DB_POOL.set(pool).expect("init_db called more than once.");
}

/// Returns the process-wide connection pool. Panics if `init_db` has not run.
pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL.get().expect("Database pool is not initialized.")
}
