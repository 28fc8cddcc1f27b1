//! Identity pipeline configuration.
//!
//! Configuration is deserialized once at startup and injected into the
//! claims resolver as an immutable value; nothing in the pipeline reads
//! ambient global state.
//!
//! # Example (TOML)
//!
//! ```toml
//! [azure]
//! enabled = true
//! issuer_allow_list = ["https://sts.windows.net/tenant-a/"]
//!
//! [storage]
//! backend = "postgres"
//!
//! [storage.postgres]
//! url = "postgres://localhost/gatehouse"
//! ```

use serde::{Deserialize, Serialize};

/// Root identity pipeline configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Azure-AD-style external provider settings.
    pub azure: AzureAdConfig,

    /// Storage backend selection and connection settings.
    pub storage: StorageSettings,
}

/// Settings for the Azure-AD-style external provider.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AzureAdConfig {
    /// Whether Azure AD integration is enabled.
    ///
    /// When disabled, tokens presented under the Azure scheme are treated
    /// like any other external provider and no issuer gate applies.
    pub enabled: bool,

    /// Issuers trusted to sign Azure AD tokens.
    ///
    /// An issuer not on this list is rejected even when the token's claims
    /// are well-formed.
    pub issuer_allow_list: Vec<String>,
}

impl AzureAdConfig {
    /// Returns `true` if the given issuer is trusted.
    #[must_use]
    pub fn is_issuer_allowed(&self, issuer: &str) -> bool {
        self.issuer_allow_list.iter().any(|i| i == issuer)
    }
}

/// Storage backend selection and connection settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Which backend serves the user and resource repositories.
    pub backend: StorageBackend,

    /// Connection settings for the relational backend.
    pub postgres: PostgresSettings,
}

/// The storage backend serving the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Document store backend (no native uniqueness constraint).
    #[default]
    Document,
    /// Relational backend with schema-enforced integrity.
    Postgres,
}

/// Connection settings for the PostgreSQL backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PostgresSettings {
    /// Database connection URL.
    pub url: String,

    /// Maximum size of the connection pool.
    pub max_connections: u32,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/gatehouse".to_string(),
            max_connections: 5,
        }
    }
}
