//! Document-backed user repository.

use async_trait::async_trait;
use gatehouse_identity::storage::user::{SearchKind, User, UserStore};
use gatehouse_storage::{DocumentStore, StorageResult};

/// Key prefix for user documents.
const USER_KIND: &str = "user";

/// Builds the lowercase document key for a user identity.
fn user_key(subject_id: &str, provider_name: &str) -> String {
    format!("{USER_KIND}:{subject_id}:{provider_name}").to_lowercase()
}

/// Key prefix matching every provider record for a subject.
fn subject_prefix(subject_id: &str) -> String {
    format!("{USER_KIND}:{subject_id}:").to_lowercase()
}

/// [`UserStore`] over a document store.
///
/// Keys are `"user:{subject_id}:{provider}"`, lowercased so lookups are
/// case-insensitive while the stored payload keeps original casing.
/// Uniqueness of the identity key rests on the store's conditional add.
#[derive(Debug, Clone)]
pub struct DocumentUserStore<D> {
    documents: D,
}

impl<D: DocumentStore> DocumentUserStore<D> {
    /// Creates a user repository over a document store.
    pub fn new(documents: D) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl<D: DocumentStore> UserStore for DocumentUserStore<D> {
    async fn find_by_subject_id(&self, subject_id: &str) -> StorageResult<Option<User>> {
        let users: Vec<User> = self
            .documents
            .list_documents(&subject_prefix(subject_id))
            .await?;
        Ok(users.into_iter().next())
    }

    async fn find_by_provider(
        &self,
        provider_name: &str,
        subject_id: &str,
    ) -> StorageResult<Option<User>> {
        self.documents
            .get_document(&user_key(subject_id, provider_name))
            .await
    }

    async fn add(&self, user: &User) -> StorageResult<User> {
        let key = user_key(&user.subject_id, &user.provider_name);
        self.documents.add_document(&key, user).await?;
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> StorageResult<()> {
        let key = user_key(&user.subject_id, &user.provider_name);
        self.documents.update_document(&key, user).await
    }

    async fn find_by_subject_ids(&self, subject_ids: &[String]) -> StorageResult<Vec<User>> {
        let mut users = Vec::new();
        for subject_id in subject_ids {
            users.extend(
                self.documents
                    .list_documents::<User>(&subject_prefix(subject_id))
                    .await?,
            );
        }
        Ok(users)
    }

    async fn search(&self, _text: &str, _kind: SearchKind) -> StorageResult<Vec<User>> {
        // Reserved for administrative search.
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocumentStore;

    fn store() -> DocumentUserStore<MemoryDocumentStore> {
        DocumentUserStore::new(MemoryDocumentStore::new())
    }

    #[tokio::test]
    async fn test_add_then_find_by_provider() {
        let store = store();
        store.add(&User::new("corp", "u1")).await.unwrap();

        let found = store.find_by_provider("corp", "u1").await.unwrap().unwrap();
        assert_eq!(found.subject_id, "u1");
        assert!(store.find_by_provider("corp", "u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identity_key_is_case_insensitive() {
        let store = store();
        store.add(&User::new("okta", "abc123")).await.unwrap();

        let found = store
            .find_by_provider("Okta", "ABC123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.subject_id, "abc123");

        // Differently-cased duplicate is still a duplicate.
        let err = store.add(&User::new("OKTA", "Abc123")).await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_payload_preserves_original_casing() {
        let store = store();
        store.add(&User::new("Okta", "ABC123")).await.unwrap();

        let found = store
            .find_by_provider("okta", "abc123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.subject_id, "ABC123");
        assert_eq!(found.provider_name, "Okta");
    }

    #[tokio::test]
    async fn test_find_by_subject_id_spans_providers() {
        let store = store();
        store.add(&User::new("corp", "u1")).await.unwrap();
        store.add(&User::new("okta", "u1")).await.unwrap();

        let found = store.find_by_subject_id("u1").await.unwrap().unwrap();
        assert_eq!(found.subject_id, "u1");
        assert!(store.find_by_subject_id("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_requires_existing_user() {
        let store = store();
        let user = User::new("corp", "u1");

        assert!(store.update(&user).await.unwrap_err().is_not_found());

        store.add(&user).await.unwrap();
        let mut updated = user.clone();
        updated.username = Some("Ann".to_string());
        store.update(&updated).await.unwrap();

        let found = store.find_by_provider("corp", "u1").await.unwrap().unwrap();
        assert_eq!(found.username.as_deref(), Some("Ann"));
    }

    #[tokio::test]
    async fn test_batch_fetch_omits_unmatched() {
        let store = store();
        store.add(&User::new("corp", "u1")).await.unwrap();
        store.add(&User::new("corp", "u2")).await.unwrap();

        let users = store
            .find_by_subject_ids(&["u1".to_string(), "missing".to_string(), "u2".to_string()])
            .await
            .unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn test_search_returns_empty() {
        let store = store();
        store.add(&User::new("corp", "u1")).await.unwrap();

        let results = store.search("u1", SearchKind::User).await.unwrap();
        assert!(results.is_empty());
    }
}
