//! External directory lookups for claim enrichment.
//!
//! The directory is a read-only external system (corporate LDAP, Graph
//! API, ...) consulted during claims resolution. Lookups are strictly
//! best-effort; callers swallow failures.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::IdentityResult;
use crate::error::IdentityError;

/// Profile fields the directory may know about a subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryUser {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Middle name.
    pub middle_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

/// Read-only lookup into an external user directory.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Looks up the directory profile for an external subject id.
    async fn find_user_by_subject_id(
        &self,
        subject_id: &str,
    ) -> IdentityResult<Option<DirectoryUser>>;
}

/// Directory service that knows nobody. Used when no directory is
/// configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDirectoryService;

#[async_trait]
impl DirectoryService for NoopDirectoryService {
    async fn find_user_by_subject_id(
        &self,
        _subject_id: &str,
    ) -> IdentityResult<Option<DirectoryUser>> {
        Ok(None)
    }
}

/// In-memory directory backed by a fixed map. Intended for tests and
/// small fixed deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectoryService {
    users: HashMap<String, DirectoryUser>,
    fail: bool,
}

impl StaticDirectoryService {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding a single profile.
    #[must_use]
    pub fn with_user(subject_id: impl Into<String>, user: DirectoryUser) -> Self {
        let mut directory = Self::default();
        directory.insert(subject_id, user);
        directory
    }

    /// Creates a directory whose every lookup fails. Used to exercise
    /// best-effort enrichment paths.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            users: HashMap::new(),
            fail: true,
        }
    }

    /// Adds a profile to the directory.
    pub fn insert(&mut self, subject_id: impl Into<String>, user: DirectoryUser) {
        self.users.insert(subject_id.into(), user);
    }
}

#[async_trait]
impl DirectoryService for StaticDirectoryService {
    async fn find_user_by_subject_id(
        &self,
        subject_id: &str,
    ) -> IdentityResult<Option<DirectoryUser>> {
        if self.fail {
            return Err(IdentityError::configuration("directory unavailable"));
        }
        Ok(self.users.get(subject_id).cloned())
    }
}
