//! Generic document store abstraction.
//!
//! A document store holds typed JSON documents addressed by string keys of
//! the form `{kind}:{rest}`. It carries no business rules; repositories are
//! layered on top of it.
//!
//! The store has no native uniqueness constraint beyond the key itself, so
//! [`DocumentStore::add_document`] is specified as a conditional write: it
//! succeeds only if the key is absent. Racing writers are decided at write
//! time, not by the caller's earlier existence check.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::StorageResult;

/// Returns the kind segment of a document key (the part before the first
/// `:`), used when constructing storage errors.
#[must_use]
pub fn kind_of_key(key: &str) -> &str {
    key.split(':').next().unwrap_or(key)
}

/// Typed key/document CRUD over an underlying store.
///
/// Implementations must treat every operation as an independent asynchronous
/// I/O call with no ordering guarantee relative to other concurrent callers.
///
/// # Example
///
/// ```ignore
/// use gatehouse_storage::DocumentStore;
///
/// async fn example(store: &impl DocumentStore) -> gatehouse_storage::StorageResult<()> {
///     let doc = serde_json::json!({"name": "profile"});
///     store.add_document("identityresource:profile", &doc).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the document stored under `key`.
    ///
    /// Returns `None` if no document exists for the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or the stored document
    /// cannot be deserialized into `T`.
    async fn get_document<T>(&self, key: &str) -> StorageResult<Option<T>>
    where
        T: DeserializeOwned + Send;

    /// Fetch every document whose key starts with `prefix`, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or a stored document
    /// cannot be deserialized into `T`.
    async fn list_documents<T>(&self, prefix: &str) -> StorageResult<Vec<T>>
    where
        T: DeserializeOwned + Send;

    /// Store a new document under `key`.
    ///
    /// This is a conditional write: it fails with
    /// [`StorageError::AlreadyExists`](crate::StorageError::AlreadyExists) if the key is already present, so that
    /// exactly one of two racing writers succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the key exists or the storage operation fails.
    async fn add_document<T>(&self, key: &str, document: &T) -> StorageResult<()>
    where
        T: Serialize + Sync;

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`](crate::StorageError::NotFound) if no document exists for the key,
    /// or another error if the storage operation fails.
    async fn update_document<T>(&self, key: &str, document: &T) -> StorageResult<()>
    where
        T: Serialize + Sync;

    /// Remove the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`](crate::StorageError::NotFound) if no document exists for the key,
    /// or another error if the storage operation fails.
    async fn delete_document(&self, key: &str) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_key() {
        assert_eq!(kind_of_key("user:abc:okta"), "user");
        assert_eq!(kind_of_key("apiresource:patient-api"), "apiresource");
        assert_eq!(kind_of_key("allowedOrigins"), "allowedOrigins");
    }
}
