//! Document-backed resource repository.

use async_trait::async_trait;
use gatehouse_identity::storage::resource::{
    ApiResource, IdentityResource, ResourceStore, Resources,
};
use gatehouse_storage::{DocumentStore, StorageResult};

const IDENTITY_RESOURCE_KIND: &str = "identityresource";
const API_RESOURCE_KIND: &str = "apiresource";

fn identity_resource_key(name: &str) -> String {
    format!("{IDENTITY_RESOURCE_KIND}:{name}").to_lowercase()
}

fn api_resource_key(name: &str) -> String {
    format!("{API_RESOURCE_KIND}:{name}").to_lowercase()
}

/// [`ResourceStore`] over a document store.
///
/// Resources are stored whole (scopes, secrets, and scope claims inside
/// the document), so every read is eager by construction. Name
/// uniqueness rests on the store's conditional add; keys are lowercased
/// for case-insensitive lookup.
#[derive(Debug, Clone)]
pub struct DocumentResourceStore<D> {
    documents: D,
}

impl<D: DocumentStore> DocumentResourceStore<D> {
    /// Creates a resource repository over a document store.
    pub fn new(documents: D) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl<D: DocumentStore> ResourceStore for DocumentResourceStore<D> {
    async fn find_identity_resources_by_scope(
        &self,
        scope_names: &[String],
    ) -> StorageResult<Vec<IdentityResource>> {
        let all: Vec<IdentityResource> = self
            .documents
            .list_documents(&format!("{IDENTITY_RESOURCE_KIND}:"))
            .await?;
        Ok(all
            .into_iter()
            .filter(|r| scope_names.contains(&r.name))
            .collect())
    }

    async fn find_api_resources_by_scope(
        &self,
        scope_names: &[String],
    ) -> StorageResult<Vec<ApiResource>> {
        let all: Vec<ApiResource> = self
            .documents
            .list_documents(&format!("{API_RESOURCE_KIND}:"))
            .await?;
        Ok(all
            .into_iter()
            .filter(|r| r.owns_scope(scope_names))
            .collect())
    }

    async fn find_api_resource(&self, name: &str) -> StorageResult<Option<ApiResource>> {
        self.documents.get_document(&api_resource_key(name)).await
    }

    async fn find_identity_resource(
        &self,
        name: &str,
    ) -> StorageResult<Option<IdentityResource>> {
        self.documents
            .get_document(&identity_resource_key(name))
            .await
    }

    async fn get_all_resources(&self) -> StorageResult<Resources> {
        Ok(Resources {
            identity_resources: self
                .documents
                .list_documents(&format!("{IDENTITY_RESOURCE_KIND}:"))
                .await?,
            api_resources: self
                .documents
                .list_documents(&format!("{API_RESOURCE_KIND}:"))
                .await?,
        })
    }

    async fn add_identity_resource(&self, resource: &IdentityResource) -> StorageResult<()> {
        self.documents
            .add_document(&identity_resource_key(&resource.name), resource)
            .await
    }

    async fn add_api_resource(&self, resource: &ApiResource) -> StorageResult<()> {
        self.documents
            .add_document(&api_resource_key(&resource.name), resource)
            .await
    }

    async fn delete_identity_resource(&self, name: &str) -> StorageResult<()> {
        self.documents
            .delete_document(&identity_resource_key(name))
            .await
    }

    async fn delete_api_resource(&self, name: &str) -> StorageResult<()> {
        self.documents
            .delete_document(&api_resource_key(name))
            .await
    }
}
