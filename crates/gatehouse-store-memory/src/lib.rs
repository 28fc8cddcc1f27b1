//! In-memory document backend for the Gatehouse identity provider.
//!
//! Provides [`MemoryDocumentStore`], a lock-free key/document store, and
//! the document-backed repositories over it:
//!
//! - [`DocumentUserStore`] - users keyed by `"user:{subject}:{provider}"`
//! - [`DocumentResourceStore`] - resource metadata stored whole per
//!   document
//! - [`DocumentCorsPolicy`] - allow-list membership from one document
//!
//! The repositories work over any [`DocumentStore`](gatehouse_storage::DocumentStore)
//! implementation; the in-memory store here is the reference one, suited
//! to tests and single-node deployments.

pub mod cors;
pub mod document;
pub mod resource;
pub mod user;

pub use cors::DocumentCorsPolicy;
pub use document::MemoryDocumentStore;
pub use resource::DocumentResourceStore;
pub use user::DocumentUserStore;
