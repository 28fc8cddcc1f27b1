//! PostgreSQL storage backend for the Gatehouse identity provider.
//!
//! Provides persistent storage for:
//!
//! - Provisioned users (JSONB payload, lowercase identity key columns)
//! - Identity resources and API resources (normalized tables with
//!   schema-enforced name uniqueness)
//!
//! Uniqueness is enforced by unique indexes, so racing writers are
//! resolved by the database; violations surface as
//! [`StorageError::AlreadyExists`](gatehouse_storage::StorageError::AlreadyExists)
//! just like the document backend's conditional writes.
//!
//! # Example
//!
//! ```ignore
//! use gatehouse_store_postgres::PostgresIdentityStorage;
//!
//! let storage = PostgresIdentityStorage::connect("postgres://localhost/gatehouse").await?;
//! let user = storage.users().find_by_provider("corp", "u1").await?;
//! ```

pub mod resource;
pub mod user;

use std::sync::Arc;

use gatehouse_storage::StorageError;
use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

pub use resource::PgResourceStore;
pub use user::PgUserStore;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

/// Maps a database error onto the normalized storage error set.
///
/// Unique violations are handled at the call sites that expect them;
/// everything else is infrastructure.
pub(crate) fn map_sqlx_err(err: sqlx_core::Error) -> StorageError {
    match err {
        sqlx_core::Error::Io(_)
        | sqlx_core::Error::Tls(_)
        | sqlx_core::Error::PoolTimedOut
        | sqlx_core::Error::PoolClosed => StorageError::connection(err.to_string()),
        other => StorageError::internal(other.to_string()),
    }
}

/// PostgreSQL-backed identity storage.
///
/// Holds a connection pool and hands out the repository implementations
/// sharing it.
#[derive(Debug, Clone)]
pub struct PostgresIdentityStorage {
    pool: Arc<PgPool>,
}

impl PostgresIdentityStorage {
    /// Create new storage with an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create new storage by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        use sqlx_core::pool::PoolOptions;
        let pool = PoolOptions::<Postgres>::new()
            .connect(database_url)
            .await
            .map_err(map_sqlx_err)?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the user repository.
    #[must_use]
    pub fn users(&self) -> PgUserStore {
        PgUserStore::new(Arc::clone(&self.pool))
    }

    /// Get the resource repository.
    #[must_use]
    pub fn resources(&self) -> PgResourceStore {
        PgResourceStore::new(Arc::clone(&self.pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_map_to_connection() {
        let err = map_sqlx_err(sqlx_core::Error::PoolTimedOut);
        assert!(matches!(err, StorageError::Connection { .. }));
    }

    #[test]
    fn test_other_errors_map_to_internal() {
        let err = map_sqlx_err(sqlx_core::Error::RowNotFound);
        assert!(matches!(err, StorageError::Internal { .. }));
    }
}
