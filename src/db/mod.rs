//! Database layer for Outreach.
//!
//! Provides SQLite connection pooling and query modules
//! for all content entities.

mod blog_posts;
mod campaigns;
mod contact_messages;
mod dashboard;
mod gallery_images;
mod pool;
mod projects;
mod sponsors;
mod stories;
mod team_members;
mod users;

pub use blog_posts::*;
pub use campaigns::*;
pub use contact_messages::*;
pub use dashboard::*;
pub use gallery_images::*;
pub use pool::{create_pool_with_config, health_check, PoolConfig};
pub use projects::*;
pub use sponsors::*;
pub use stories::*;
pub use team_members::*;
pub use users::*;

use crate::Result;
use tracing::info;

/// Type alias for the SQLite connection pool.
pub type DbPool = sqlx::SqlitePool;

/// Initialize the database connection pool.
///
/// Creates parent directories if needed. `:memory:` databases are pinned
/// to a single connection.
pub async fn init_pool(path: &str) -> Result<DbPool> {
    let pool = create_pool_with_config(path, PoolConfig::for_path(path)).await?;

    info!("Database pool initialized: {}", path);

    Ok(pool)
}

/// Initialize the database schema.
///
/// Applies the complete schema from schema.sql. Uses IF NOT EXISTS
/// clauses so it's safe to run multiple times.
pub async fn initialize_schema(pool: &DbPool) -> Result<()> {
    let schema = include_str!("../../schema.sql");

    info!("Initializing database schema");

    for statement in schema.split(';') {
        // Strip comment lines, keeping only actual SQL
        let clean_stmt: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let clean_stmt = clean_stmt.trim();
        if clean_stmt.is_empty() {
            continue;
        }
        sqlx::query(clean_stmt).execute(pool).await?;
    }

    info!("Database schema initialized successfully");

    Ok(())
}

/// Current UTC timestamp in the stored format.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Generate a new record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Run a `SELECT COUNT(*)` style query.
pub(crate) async fn count(pool: &DbPool, sql: &str) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as(sql).fetch_one(pool).await?;
    Ok(n)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    let pool = init_pool(":memory:").await.unwrap();
    initialize_schema(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_initialization() {
        let pool = test_pool().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();

        for expected in [
            "blog_posts",
            "campaigns",
            "contact_messages",
            "gallery_images",
            "projects",
            "revoked_tokens",
            "sponsors",
            "stories",
            "team_members",
            "users",
        ] {
            assert!(table_names.contains(&expected), "{} table missing", expected);
        }
    }

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let pool = test_pool().await;
        initialize_schema(&pool).await.unwrap();
    }

    #[test]
    fn test_timestamps_sort_lexically() {
        let a = timestamp();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = timestamp();
        assert!(a < b);
    }
}
