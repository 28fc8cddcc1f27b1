//! Resource storage.
//!
//! Resources are normalized: identity resources in one table, API
//! resources with child tables for secrets and scopes (cascade on
//! delete). Name uniqueness is enforced by unique indexes over
//! `LOWER(name)`, so the database resolves concurrent creates.

use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_identity::storage::resource::{
    ApiResource, ApiScope, IdentityResource, ResourceStore, Resources, Secret,
};
use gatehouse_storage::{StorageError, StorageResult};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;

use crate::{PgPool, map_sqlx_err};

type IdentityResourceRow = (String, Option<String>, serde_json::Value);
type SecretRow = (String, Option<String>, Option<OffsetDateTime>);
type ScopeRow = (String, Option<String>, serde_json::Value);

fn claims_from_json(value: serde_json::Value) -> StorageResult<Vec<String>> {
    Ok(serde_json::from_value(value)?)
}

fn identity_resource_from_row(row: IdentityResourceRow) -> StorageResult<IdentityResource> {
    Ok(IdentityResource {
        name: row.0,
        display_name: row.1,
        user_claims: claims_from_json(row.2)?,
    })
}

/// Resource repository over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgResourceStore {
    pool: Arc<PgPool>,
}

impl PgResourceStore {
    /// Create a new resource repository sharing a connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Assembles a full API resource: base row plus secrets and scopes.
    async fn load_api_resource(&self, name: &str) -> StorageResult<Option<ApiResource>> {
        let base: Option<IdentityResourceRow> = query_as(
            r#"
            SELECT name, display_name, user_claims
            FROM api_resources
            WHERE LOWER(name) = LOWER($1)
            "#,
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let Some((name, display_name, user_claims)) = base else {
            return Ok(None);
        };

        let secrets: Vec<SecretRow> = query_as(
            r#"
            SELECT value, secret_type, expiration
            FROM api_resource_secrets
            WHERE api_resource_name = $1
            ORDER BY value
            "#,
        )
        .bind(&name)
        .fetch_all(&*self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let scopes: Vec<ScopeRow> = query_as(
            r#"
            SELECT name, display_name, user_claims
            FROM api_resource_scopes
            WHERE api_resource_name = $1
            ORDER BY name
            "#,
        )
        .bind(&name)
        .fetch_all(&*self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(Some(ApiResource {
            name,
            display_name,
            user_claims: claims_from_json(user_claims)?,
            secrets: secrets
                .into_iter()
                .map(|(value, secret_type, expiration)| Secret {
                    value,
                    secret_type,
                    expiration,
                })
                .collect(),
            scopes: scopes
                .into_iter()
                .map(|(name, display_name, user_claims)| {
                    Ok(ApiScope {
                        name,
                        display_name,
                        user_claims: claims_from_json(user_claims)?,
                    })
                })
                .collect::<StorageResult<Vec<_>>>()?,
        }))
    }
}

#[async_trait]
impl ResourceStore for PgResourceStore {
    async fn find_identity_resources_by_scope(
        &self,
        scope_names: &[String],
    ) -> StorageResult<Vec<IdentityResource>> {
        let rows: Vec<IdentityResourceRow> = query_as(
            r#"
            SELECT name, display_name, user_claims
            FROM identity_resources
            WHERE name = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(scope_names)
        .fetch_all(&*self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows.into_iter().map(identity_resource_from_row).collect()
    }

    async fn find_api_resources_by_scope(
        &self,
        scope_names: &[String],
    ) -> StorageResult<Vec<ApiResource>> {
        let names: Vec<(String,)> = query_as(
            r#"
            SELECT DISTINCT r.name
            FROM api_resources r
            JOIN api_resource_scopes s ON s.api_resource_name = r.name
            WHERE s.name = ANY($1)
            ORDER BY r.name
            "#,
        )
        .bind(scope_names)
        .fetch_all(&*self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let mut resources = Vec::with_capacity(names.len());
        for (name,) in names {
            if let Some(resource) = self.load_api_resource(&name).await? {
                resources.push(resource);
            }
        }
        Ok(resources)
    }

    async fn find_api_resource(&self, name: &str) -> StorageResult<Option<ApiResource>> {
        self.load_api_resource(name).await
    }

    async fn find_identity_resource(
        &self,
        name: &str,
    ) -> StorageResult<Option<IdentityResource>> {
        let row: Option<IdentityResourceRow> = query_as(
            r#"
            SELECT name, display_name, user_claims
            FROM identity_resources
            WHERE LOWER(name) = LOWER($1)
            "#,
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.map(identity_resource_from_row).transpose()
    }

    async fn get_all_resources(&self) -> StorageResult<Resources> {
        let identity_rows: Vec<IdentityResourceRow> = query_as(
            r#"
            SELECT name, display_name, user_claims
            FROM identity_resources
            ORDER BY name
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let api_names: Vec<(String,)> = query_as("SELECT name FROM api_resources ORDER BY name")
            .fetch_all(&*self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let mut api_resources = Vec::with_capacity(api_names.len());
        for (name,) in api_names {
            if let Some(resource) = self.load_api_resource(&name).await? {
                api_resources.push(resource);
            }
        }

        Ok(Resources {
            identity_resources: identity_rows
                .into_iter()
                .map(identity_resource_from_row)
                .collect::<StorageResult<Vec<_>>>()?,
            api_resources,
        })
    }

    async fn add_identity_resource(&self, resource: &IdentityResource) -> StorageResult<()> {
        let user_claims = serde_json::to_value(&resource.user_claims)?;

        query(
            r#"
            INSERT INTO identity_resources (name, display_name, user_claims)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&resource.name)
        .bind(&resource.display_name)
        .bind(&user_claims)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if let sqlx_core::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StorageError::already_exists("identityresource", &resource.name);
            }
            map_sqlx_err(e)
        })?;

        Ok(())
    }

    async fn add_api_resource(&self, resource: &ApiResource) -> StorageResult<()> {
        let user_claims = serde_json::to_value(&resource.user_claims)?;

        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        query(
            r#"
            INSERT INTO api_resources (name, display_name, user_claims)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&resource.name)
        .bind(&resource.display_name)
        .bind(&user_claims)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx_core::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StorageError::already_exists("apiresource", &resource.name);
            }
            map_sqlx_err(e)
        })?;

        for secret in &resource.secrets {
            query(
                r#"
                INSERT INTO api_resource_secrets (api_resource_name, value, secret_type, expiration)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&resource.name)
            .bind(&secret.value)
            .bind(&secret.secret_type)
            .bind(secret.expiration)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        }

        for scope in &resource.scopes {
            let scope_claims = serde_json::to_value(&scope.user_claims)?;
            query(
                r#"
                INSERT INTO api_resource_scopes (api_resource_name, name, display_name, user_claims)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&resource.name)
            .bind(&scope.name)
            .bind(&scope.display_name)
            .bind(&scope_claims)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn delete_identity_resource(&self, name: &str) -> StorageResult<()> {
        let result = query("DELETE FROM identity_resources WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .execute(&*self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("identityresource", name));
        }
        Ok(())
    }

    async fn delete_api_resource(&self, name: &str) -> StorageResult<()> {
        // Child rows cascade.
        let result = query("DELETE FROM api_resources WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .execute(&*self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("apiresource", name));
        }
        Ok(())
    }
}
