//! Storage abstraction layer for the Gatehouse identity provider.
//!
//! This crate defines the storage-facing contracts shared by all backends:
//!
//! - [`DocumentStore`] - generic typed key/document CRUD with an explicit
//!   conditional-write primitive
//! - [`StorageError`] / [`ErrorCategory`] - the normalized error set every
//!   backend maps onto
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `gatehouse-store-memory` - in-memory document store and the
//!   document-backed repositories
//! - `gatehouse-store-postgres` - PostgreSQL relational backend

pub mod document;
pub mod error;

pub use document::{DocumentStore, kind_of_key};
pub use error::{ErrorCategory, StorageError};

/// Type alias for storage operation results.
pub type StorageResult<T> = Result<T, StorageError>;
