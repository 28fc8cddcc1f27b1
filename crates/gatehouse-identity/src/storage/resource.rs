//! Resource metadata records and the resource repository contract.
//!
//! Resources describe what clients may request access to: identity
//! resources bundle user claims under a scope name, API resources own a
//! set of scopes and per-resource secrets.

use async_trait::async_trait;
use gatehouse_storage::StorageResult;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A named bundle of user claims addressable as a scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityResource {
    /// Unique resource name; doubles as the scope name.
    pub name: String,

    /// Human-readable display name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Claim types delivered when the scope is granted.
    #[serde(default)]
    pub user_claims: Vec<String>,
}

impl IdentityResource {
    /// Creates an identity resource with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A protected API with its owned scopes and secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResource {
    /// Unique resource name.
    pub name: String,

    /// Human-readable display name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Secrets the API authenticates itself with.
    #[serde(default)]
    pub secrets: Vec<Secret>,

    /// Claim types delivered in access tokens for this API.
    #[serde(default)]
    pub user_claims: Vec<String>,

    /// Scopes owned by this API.
    #[serde(default)]
    pub scopes: Vec<ApiScope>,
}

impl ApiResource {
    /// Creates an API resource with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if this API owns a scope with any of the given
    /// names.
    #[must_use]
    pub fn owns_scope(&self, scope_names: &[String]) -> bool {
        self.scopes.iter().any(|s| scope_names.contains(&s.name))
    }
}

/// A scope owned by an API resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiScope {
    /// Scope name as requested by clients.
    pub name: String,

    /// Human-readable display name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Claim types delivered when the scope is granted.
    #[serde(default)]
    pub user_claims: Vec<String>,
}

impl ApiScope {
    /// Creates a scope with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A hashed secret value with an optional expiration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// The (hashed) secret value.
    pub value: String,

    /// Secret type discriminator.
    #[serde(default)]
    pub secret_type: Option<String>,

    /// When the secret stops being valid, if ever.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expiration: Option<OffsetDateTime>,
}

/// Full snapshot of all stored resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// All identity resources.
    pub identity_resources: Vec<IdentityResource>,

    /// All API resources.
    pub api_resources: Vec<ApiResource>,
}

/// Repository of resource metadata.
///
/// Reads serve the token-minting scope-resolution step; writes serve the
/// administrative surface. Name uniqueness is enforced per backend but
/// always surfaces as
/// [`StorageError::AlreadyExists`](gatehouse_storage::StorageError::AlreadyExists).
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Returns every identity resource whose name is in `scope_names`.
    /// Unmatched names are dropped silently.
    async fn find_identity_resources_by_scope(
        &self,
        scope_names: &[String],
    ) -> StorageResult<Vec<IdentityResource>>;

    /// Returns every API resource owning at least one scope named in
    /// `scope_names`.
    async fn find_api_resources_by_scope(
        &self,
        scope_names: &[String],
    ) -> StorageResult<Vec<ApiResource>>;

    /// Finds an API resource by name, case-insensitively. The result is
    /// fully loaded: secrets, scopes, and scope claims included.
    async fn find_api_resource(&self, name: &str) -> StorageResult<Option<ApiResource>>;

    /// Finds an identity resource by name, case-insensitively.
    async fn find_identity_resource(&self, name: &str)
    -> StorageResult<Option<IdentityResource>>;

    /// Full snapshot of all resources.
    async fn get_all_resources(&self) -> StorageResult<Resources>;

    /// Creates an identity resource. Fails with `AlreadyExists` when the
    /// name is taken (case-insensitively).
    async fn add_identity_resource(&self, resource: &IdentityResource) -> StorageResult<()>;

    /// Creates an API resource. Fails with `AlreadyExists` when the name
    /// is taken (case-insensitively).
    async fn add_api_resource(&self, resource: &ApiResource) -> StorageResult<()>;

    /// Deletes an identity resource. Fails with `NotFound` when absent.
    async fn delete_identity_resource(&self, name: &str) -> StorageResult<()>;

    /// Deletes an API resource. Fails with `NotFound` when absent.
    async fn delete_api_resource(&self, name: &str) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owns_scope() {
        let mut api = ApiResource::new("patient-api");
        api.scopes.push(ApiScope::new("patient.read"));
        api.scopes.push(ApiScope::new("patient.write"));

        assert!(api.owns_scope(&["patient.read".to_string()]));
        assert!(api.owns_scope(&["other".to_string(), "patient.write".to_string()]));
        assert!(!api.owns_scope(&["other".to_string()]));
        assert!(!api.owns_scope(&[]));
    }

    #[test]
    fn test_api_resource_round_trips_through_json() {
        let mut api = ApiResource::new("patient-api");
        api.display_name = Some("Patient API".to_string());
        api.user_claims.push("role".to_string());
        api.scopes.push(ApiScope {
            name: "patient.read".to_string(),
            display_name: None,
            user_claims: vec!["sub".to_string()],
        });
        api.secrets.push(Secret {
            value: "hashed".to_string(),
            secret_type: Some("SharedSecret".to_string()),
            expiration: None,
        });

        let json = serde_json::to_string(&api).unwrap();
        let parsed: ApiResource = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, api);
    }

    #[test]
    fn test_identity_resource_defaults() {
        let json = r#"{ "name": "openid" }"#;
        let resource: IdentityResource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.name, "openid");
        assert!(resource.display_name.is_none());
        assert!(resource.user_claims.is_empty());
    }
}
