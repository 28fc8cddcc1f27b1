//! User storage.
//!
//! Users are stored as JSONB payloads keyed by lowercase identity key
//! columns, so lookups are case-insensitive while the payload keeps the
//! original casing. The composite primary key enforces uniqueness of
//! `(provider, subject)`.

use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_identity::storage::user::{SearchKind, User, UserStore};
use gatehouse_storage::{StorageError, StorageResult};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;

use crate::{PgPool, map_sqlx_err};

/// User repository over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: Arc<PgPool>,
}

impl PgUserStore {
    /// Create a new user repository sharing a connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    fn decode(resource: serde_json::Value) -> StorageResult<User> {
        Ok(serde_json::from_value(resource)?)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_subject_id(&self, subject_id: &str) -> StorageResult<Option<User>> {
        let row: Option<(serde_json::Value,)> = query_as(
            r#"
            SELECT resource
            FROM users
            WHERE subject_id_lower = LOWER($1)
            ORDER BY provider_name_lower
            LIMIT 1
            "#,
        )
        .bind(subject_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.map(|(resource,)| Self::decode(resource)).transpose()
    }

    async fn find_by_provider(
        &self,
        provider_name: &str,
        subject_id: &str,
    ) -> StorageResult<Option<User>> {
        let row: Option<(serde_json::Value,)> = query_as(
            r#"
            SELECT resource
            FROM users
            WHERE provider_name_lower = LOWER($1)
              AND subject_id_lower = LOWER($2)
            "#,
        )
        .bind(provider_name)
        .bind(subject_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.map(|(resource,)| Self::decode(resource)).transpose()
    }

    async fn add(&self, user: &User) -> StorageResult<User> {
        let resource = serde_json::to_value(user)?;

        query(
            r#"
            INSERT INTO users (provider_name_lower, subject_id_lower, resource)
            VALUES (LOWER($1), LOWER($2), $3)
            "#,
        )
        .bind(&user.provider_name)
        .bind(&user.subject_id)
        .bind(&resource)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if let sqlx_core::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StorageError::already_exists(
                    "user",
                    format!("{}:{}", user.subject_id, user.provider_name),
                );
            }
            map_sqlx_err(e)
        })?;

        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> StorageResult<()> {
        let resource = serde_json::to_value(user)?;

        let result = query(
            r#"
            UPDATE users
            SET resource = $3,
                updated_at = NOW()
            WHERE provider_name_lower = LOWER($1)
              AND subject_id_lower = LOWER($2)
            "#,
        )
        .bind(&user.provider_name)
        .bind(&user.subject_id)
        .bind(&resource)
        .execute(&*self.pool)
        .await
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(
                "user",
                format!("{}:{}", user.subject_id, user.provider_name),
            ));
        }
        Ok(())
    }

    async fn find_by_subject_ids(&self, subject_ids: &[String]) -> StorageResult<Vec<User>> {
        let lowered: Vec<String> = subject_ids.iter().map(|s| s.to_lowercase()).collect();

        let rows: Vec<(serde_json::Value,)> = query_as(
            r#"
            SELECT resource
            FROM users
            WHERE subject_id_lower = ANY($1)
            ORDER BY subject_id_lower, provider_name_lower
            "#,
        )
        .bind(&lowered)
        .fetch_all(&*self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows.into_iter()
            .map(|(resource,)| Self::decode(resource))
            .collect()
    }

    async fn search(&self, _text: &str, _kind: SearchKind) -> StorageResult<Vec<User>> {
        // Reserved for administrative search.
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_malformed_payload() {
        let err = PgUserStore::decode(serde_json::json!({ "unexpected": true })).unwrap_err();
        assert!(matches!(err, StorageError::InvalidDocument { .. }));
    }

    #[test]
    fn test_decode_round_trip() {
        let user = User::new("Corp", "U1");
        let value = serde_json::to_value(&user).unwrap();
        let decoded = PgUserStore::decode(value).unwrap();
        assert_eq!(decoded, user);
    }
}
