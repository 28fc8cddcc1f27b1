//! Provisioned user records and the user repository contract.

use std::collections::HashMap;

use async_trait::async_trait;
use gatehouse_storage::StorageResult;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::claims::types::{Claim, claim_types};

/// A locally provisioned user, keyed by `(subject_id, provider_name)`.
///
/// The key is case-insensitive; backends fold it to lowercase for lookup
/// while the stored payload preserves original casing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable external identifier within the provider.
    pub subject_id: String,

    /// Logical provider name the user authenticated through.
    pub provider_name: String,

    /// Display name derived from the canonical name claim.
    #[serde(default)]
    pub username: Option<String>,

    /// Given name derived from claims.
    #[serde(default)]
    pub first_name: Option<String>,

    /// Middle name derived from claims.
    #[serde(default)]
    pub middle_name: Option<String>,

    /// Family name derived from claims.
    #[serde(default)]
    pub last_name: Option<String>,

    /// The user's current claim set. Replaced wholesale on every login.
    #[serde(default)]
    pub claims: Vec<Claim>,

    /// Most recent login time per client application.
    #[serde(default)]
    pub last_login_dates_by_client: HashMap<String, OffsetDateTime>,

    /// When the record was first provisioned.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the record was last written.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Creates a new user record for a provider/subject pair.
    #[must_use]
    pub fn new(provider_name: impl Into<String>, subject_id: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            subject_id: subject_id.into(),
            provider_name: provider_name.into(),
            username: None,
            first_name: None,
            middle_name: None,
            last_name: None,
            claims: Vec::new(),
            last_login_dates_by_client: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the claim set and re-derives the name fields from it.
    ///
    /// Name fields are assigned sequentially, so when the set carries
    /// multiple claims of one name type the last one wins.
    pub fn apply_claims(&mut self, claims: Vec<Claim>) {
        self.username = None;
        self.first_name = None;
        self.middle_name = None;
        self.last_name = None;

        for claim in &claims {
            match claim.claim_type.as_str() {
                claim_types::NAME => self.username = Some(claim.value.clone()),
                claim_types::GIVEN_NAME => self.first_name = Some(claim.value.clone()),
                claim_types::MIDDLE_NAME => self.middle_name = Some(claim.value.clone()),
                claim_types::FAMILY_NAME => self.last_name = Some(claim.value.clone()),
                _ => {}
            }
        }

        self.claims = claims;
    }

    /// Records a login for a client, overwriting any previous timestamp.
    pub fn set_last_login_date_for_client(&mut self, client_id: &str, login_date: OffsetDateTime) {
        self.last_login_dates_by_client
            .insert(client_id.to_string(), login_date);
    }

    /// The most recent login timestamp for a client, if any.
    #[must_use]
    pub fn last_login_date_for_client(&self, client_id: &str) -> Option<OffsetDateTime> {
        self.last_login_dates_by_client.get(client_id).copied()
    }
}

/// Entity kinds accepted by [`UserStore::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// Search across user records.
    User,
}

/// Repository of provisioned users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by subject id across providers.
    async fn find_by_subject_id(&self, subject_id: &str) -> StorageResult<Option<User>>;

    /// Finds a user by provider and subject id. Lookup is
    /// case-insensitive.
    async fn find_by_provider(
        &self,
        provider_name: &str,
        subject_id: &str,
    ) -> StorageResult<Option<User>>;

    /// Adds a new user. Fails with
    /// [`StorageError::AlreadyExists`](gatehouse_storage::StorageError::AlreadyExists)
    /// when the `(subject_id, provider_name)` key is already taken.
    async fn add(&self, user: &User) -> StorageResult<User>;

    /// Updates an existing user. Fails with
    /// [`StorageError::NotFound`](gatehouse_storage::StorageError::NotFound)
    /// when no record exists for the key.
    async fn update(&self, user: &User) -> StorageResult<()>;

    /// Best-effort batch fetch by subject ids; unmatched ids are omitted.
    async fn find_by_subject_ids(&self, subject_ids: &[String]) -> StorageResult<Vec<User>>;

    /// Administrative search. Reserved; implementations currently return
    /// an empty result unconditionally.
    async fn search(&self, text: &str, kind: SearchKind) -> StorageResult<Vec<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::types::Claim;

    #[test]
    fn test_apply_claims_derives_name_fields() {
        let mut user = User::new("corp", "u1");
        user.apply_claims(vec![
            Claim::new(claim_types::NAME, "Ann Droid"),
            Claim::new(claim_types::GIVEN_NAME, "Ann"),
            Claim::new(claim_types::FAMILY_NAME, "Droid"),
            Claim::new(claim_types::EMAIL, "ann@example.com"),
        ]);

        assert_eq!(user.username.as_deref(), Some("Ann Droid"));
        assert_eq!(user.first_name.as_deref(), Some("Ann"));
        assert_eq!(user.last_name.as_deref(), Some("Droid"));
        assert!(user.middle_name.is_none());
        assert_eq!(user.claims.len(), 4);
    }

    #[test]
    fn test_apply_claims_last_of_duplicate_type_wins() {
        let mut user = User::new("corp", "u1");
        user.apply_claims(vec![
            Claim::new(claim_types::GIVEN_NAME, "First"),
            Claim::new(claim_types::GIVEN_NAME, "Second"),
        ]);

        assert_eq!(user.first_name.as_deref(), Some("Second"));
    }

    #[test]
    fn test_apply_claims_clears_stale_name_fields() {
        let mut user = User::new("corp", "u1");
        user.apply_claims(vec![Claim::new(claim_types::GIVEN_NAME, "Ann")]);
        user.apply_claims(vec![Claim::new(claim_types::FAMILY_NAME, "Droid")]);

        assert!(user.first_name.is_none());
        assert_eq!(user.last_name.as_deref(), Some("Droid"));
    }

    #[test]
    fn test_last_login_overwrites() {
        let mut user = User::new("corp", "u1");
        let first = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let second = OffsetDateTime::from_unix_timestamp(1_700_000_500).unwrap();

        user.set_last_login_date_for_client("app1", first);
        user.set_last_login_date_for_client("app1", second);
        user.set_last_login_date_for_client("app2", first);

        assert_eq!(user.last_login_date_for_client("app1"), Some(second));
        assert_eq!(user.last_login_date_for_client("app2"), Some(first));
        assert!(user.last_login_date_for_client("app3").is_none());
    }

    #[test]
    fn test_user_round_trips_through_json() {
        let mut user = User::new("corp", "U1");
        user.apply_claims(vec![Claim::new(claim_types::GIVEN_NAME, "Ann")]);
        user.set_last_login_date_for_client(
            "app1",
            OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        );

        let json = serde_json::to_string(&user).unwrap();
        let parsed: User = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, user);
        // Stored payload preserves original casing.
        assert_eq!(parsed.subject_id, "U1");
    }
}
