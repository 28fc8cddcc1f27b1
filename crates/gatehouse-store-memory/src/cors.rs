//! Document-backed cross-origin allow-list.

use async_trait::async_trait;
use gatehouse_identity::storage::cors::{ALLOWED_ORIGINS_KEY, ClientOriginList, CorsPolicy};
use gatehouse_storage::{DocumentStore, StorageResult};

/// [`CorsPolicy`] reading the allow-list from a single document.
#[derive(Debug, Clone)]
pub struct DocumentCorsPolicy<D> {
    documents: D,
}

impl<D: DocumentStore> DocumentCorsPolicy<D> {
    /// Creates a CORS policy over a document store.
    pub fn new(documents: D) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl<D: DocumentStore> CorsPolicy for DocumentCorsPolicy<D> {
    async fn is_origin_allowed(&self, origin: &str) -> StorageResult<bool> {
        let list: Option<ClientOriginList> =
            self.documents.get_document(ALLOWED_ORIGINS_KEY).await?;
        Ok(list.is_some_and(|l| l.allowed_origins.iter().any(|o| o == origin)))
    }
}
