//! Cross-origin allow-list contract.

use async_trait::async_trait;
use gatehouse_storage::StorageResult;
use serde::{Deserialize, Serialize};

/// Document key under which the origin allow-list is stored.
pub const ALLOWED_ORIGINS_KEY: &str = "allowedOrigins";

/// The stored origin allow-list. A single document; origins are matched
/// by exact string equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOriginList {
    /// Origins permitted to make cross-origin requests.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Per-request cross-origin check invoked by the token-issuance layer.
#[async_trait]
pub trait CorsPolicy: Send + Sync {
    /// Returns `true` if the origin is on the stored allow-list. A
    /// missing allow-list document means no origin is allowed.
    async fn is_origin_allowed(&self, origin: &str) -> StorageResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_list_deserialization() {
        let json = r#"{ "allowed_origins": ["https://app.example"] }"#;
        let list: ClientOriginList = serde_json::from_str(json).unwrap();
        assert_eq!(list.allowed_origins, vec!["https://app.example"]);

        let empty: ClientOriginList = serde_json::from_str("{}").unwrap();
        assert!(empty.allowed_origins.is_empty());
    }
}
