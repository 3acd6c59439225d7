pub mod page;
pub mod queries;

use std::str::FromStr;

use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use page::{Page, PageParams, Paginated};
pub use queries::categories::Category;
pub use queries::questions::{NewQuestion, Question, QuestionRecord};

/// Value of `DB_PATH` that keeps the whole database in memory.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: i64 },

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] MigrateError),
}

pub type DbResult<T> = Result<T, DbError>;

/// Connections register `REGEXP`, which question search relies on.
pub async fn establish_connection(path: &str) -> DbResult<SqlitePool> {
    if path == IN_MEMORY {
        return establish_in_memory().await;
    }
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .with_regexp();
    Ok(SqlitePool::connect_with(options).await?)
}

/// Every connection to `sqlite::memory:` opens a fresh database, so the pool
/// is pinned to a single connection that never expires.
pub async fn establish_in_memory() -> DbResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?
        .foreign_keys(true)
        .with_regexp();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = establish_in_memory().await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}
