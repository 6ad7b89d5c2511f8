pub mod errors;
pub mod models;
pub mod pool;
pub mod schema;

use deadpool_diesel::{
    Runtime,
    postgres::{Manager, Pool},
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub use errors::{DatabaseError, InitError};
pub use pool::PoolExt;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const MAX_POOL_SIZE: usize = 16;

pub fn init_pool(app_name: &str, database_url: &str) -> Result<Pool, InitError> {
    let manager = Manager::new(database_url, Runtime::Tokio1);
    let pool = Pool::builder(manager)
        .max_size(MAX_POOL_SIZE)
        .build()
        .map_err(|e| InitError::Pool(e.to_string()))?;

    tracing::info!(app = app_name, max_size = MAX_POOL_SIZE, "Database pool ready");
    Ok(pool)
}

pub async fn run_migrations(pool: &Pool) -> Result<(), InitError> {
    let conn = pool
        .get()
        .await
        .map_err(|e| InitError::Pool(e.to_string()))?;

    let applied = conn
        .interact(|conn| {
            conn.run_pending_migrations(MIGRATIONS)
                .map(|versions| versions.len())
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| InitError::Migrations(e.to_string()))?
        .map_err(InitError::Migrations)?;

    tracing::info!(applied, "Database migrations up to date");
    Ok(())
}
