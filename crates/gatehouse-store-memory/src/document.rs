//! Lock-free in-memory document store.

use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_storage::{DocumentStore, StorageError, StorageResult, kind_of_key};
use papaya::HashMap as PapayaHashMap;
use serde::{Serialize, de::DeserializeOwned};
use tracing::trace;

/// In-memory [`DocumentStore`] backed by a lock-free concurrent map.
///
/// Documents are stored as JSON values keyed by `"{kind}:{rest}"` strings.
/// `add_document` is a true conditional write: under concurrent adds of
/// one key exactly one writer succeeds. Cloning is cheap and all clones
/// share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    data: Arc<PapayaHashMap<String, serde_json::Value>>,
}

impl MemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.pin().len()
    }

    /// Returns `true` if the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_document<T>(&self, key: &str) -> StorageResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let guard = self.data.pin();
        match guard.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    async fn list_documents<T>(&self, prefix: &str) -> StorageResult<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let guard = self.data.pin();
        let mut entries: Vec<(&String, &serde_json::Value)> = guard
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        // Deterministic order for callers that take the first match.
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        entries
            .into_iter()
            .map(|(_, value)| serde_json::from_value(value.clone()).map_err(StorageError::from))
            .collect()
    }

    async fn add_document<T>(&self, key: &str, document: &T) -> StorageResult<()>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(document)?;
        let guard = self.data.pin();
        match guard.try_insert(key.to_string(), value) {
            Ok(_) => {
                trace!(key, "document added");
                Ok(())
            }
            Err(_) => Err(StorageError::already_exists(kind_of_key(key), key)),
        }
    }

    async fn update_document<T>(&self, key: &str, document: &T) -> StorageResult<()>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(document)?;
        let guard = self.data.pin();
        if guard.update(key.to_string(), move |_| value.clone()).is_none() {
            return Err(StorageError::not_found(kind_of_key(key), key));
        }
        trace!(key, "document updated");
        Ok(())
    }

    async fn delete_document(&self, key: &str) -> StorageResult<()> {
        let guard = self.data.pin();
        if guard.remove(key).is_none() {
            return Err(StorageError::not_found(kind_of_key(key), key));
        }
        trace!(key, "document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
    }

    fn doc(name: &str) -> Doc {
        Doc {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_then_get() {
        let store = MemoryDocumentStore::new();
        store.add_document("widget:a", &doc("a")).await.unwrap();

        let found: Option<Doc> = store.get_document("widget:a").await.unwrap();
        assert_eq!(found, Some(doc("a")));

        let missing: Option<Doc> = store.get_document("widget:b").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_add_is_conditional() {
        let store = MemoryDocumentStore::new();
        store.add_document("widget:a", &doc("a")).await.unwrap();

        let err = store.add_document("widget:a", &doc("a2")).await.unwrap_err();
        assert!(err.is_already_exists());

        // The first write survives.
        let found: Option<Doc> = store.get_document("widget:a").await.unwrap();
        assert_eq!(found, Some(doc("a")));
    }

    #[tokio::test]
    async fn test_update_requires_existing_document() {
        let store = MemoryDocumentStore::new();

        let err = store.update_document("widget:a", &doc("a")).await.unwrap_err();
        assert!(err.is_not_found());

        store.add_document("widget:a", &doc("a")).await.unwrap();
        store.update_document("widget:a", &doc("a2")).await.unwrap();
        let found: Option<Doc> = store.get_document("widget:a").await.unwrap();
        assert_eq!(found, Some(doc("a2")));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryDocumentStore::new();
        store.add_document("widget:a", &doc("a")).await.unwrap();

        store.delete_document("widget:a").await.unwrap();
        assert!(store.is_empty());

        let err = store.delete_document("widget:a").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_by_prefix() {
        let store = MemoryDocumentStore::new();
        store.add_document("widget:b", &doc("b")).await.unwrap();
        store.add_document("widget:a", &doc("a")).await.unwrap();
        store.add_document("gadget:c", &doc("c")).await.unwrap();

        let widgets: Vec<Doc> = store.list_documents("widget:").await.unwrap();
        assert_eq!(widgets, vec![doc("a"), doc("b")]);

        let none: Vec<Doc> = store.list_documents("missing:").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_adds_admit_one_writer() {
        let store = MemoryDocumentStore::new();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add_document("widget:contested", &doc(&format!("w{i}"))).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(store.len(), 1);
    }
}
