//! Structured outcomes for the administrative CRUD surface.
//!
//! Repository errors are normalized here so HTTP handlers (out of this
//! crate) can translate them mechanically to status codes.

use gatehouse_storage::{StorageError, StorageResult};

/// Outcome of an administrative create or delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    /// The entity was created.
    Created,
    /// The operation succeeded with nothing to return.
    NoContent,
    /// The entity's name is already taken.
    Conflict,
    /// No entity exists under the given name.
    NotFound,
}

/// Maps a create result onto an outcome. Name collisions surface as
/// [`AdminOutcome::Conflict`]; other storage failures propagate.
pub fn create_outcome(result: StorageResult<()>) -> StorageResult<AdminOutcome> {
    match result {
        Ok(()) => Ok(AdminOutcome::Created),
        Err(err) if err.is_already_exists() => Ok(AdminOutcome::Conflict),
        Err(err) => Err(err),
    }
}

/// Maps a delete result onto an outcome. Deleting an absent entity
/// surfaces as [`AdminOutcome::NotFound`]; other storage failures
/// propagate.
pub fn delete_outcome(result: StorageResult<()>) -> StorageResult<AdminOutcome> {
    match result {
        Ok(()) => Ok(AdminOutcome::NoContent),
        Err(err) if err.is_not_found() => Ok(AdminOutcome::NotFound),
        Err(err) => Err(err),
    }
}
