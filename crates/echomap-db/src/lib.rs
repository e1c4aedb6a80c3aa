//! # echomap-db
//!
//! PostgreSQL + pgvector record store for echomap.
//!
//! This crate provides:
//! - Connection pool management
//! - SQL rendering of context filters and order keys
//! - [`PgRecordStore`], the read-only [`RecordStore`] over `audio_records`
//!
//! ## Example
//!
//! ```rust,ignore
//! use echomap_db::{ContextFilter, Database, OrderKey, RecordStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/echomap").await?;
//!     let hits = db
//!         .records
//!         .find(&ContextFilter::from_context("上海"), &[OrderKey::LikeCount], 20)
//!         .await?;
//!     println!("{} records", hits.len());
//!     Ok(())
//! }
//! ```
pub mod filter_sql;
pub mod pool;
pub mod records;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use echomap_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub use filter_sql::{ContextFilterQueryBuilder, OrderClauseBuilder, QueryParam};
pub use pool::{PoolConfig, PoolHealth};
pub use records::PgRecordStore;

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Read-only audio record store.
    pub records: PgRecordStore,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            records: PgRecordStore::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::default()).await
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = pool::connect(url, &config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::StoreUnavailable(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\path"), "c:\\\\path");
        assert_eq!(escape_like("上海"), "上海");
    }

    #[test]
    fn test_escape_like_backslash_first() {
        // A literal backslash must not re-escape the escapes added after it.
        assert_eq!(escape_like("\\%"), "\\\\\\%");
    }
}
