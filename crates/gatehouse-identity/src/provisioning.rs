//! User provisioning: the find-or-create step mapping an external
//! identity onto a local user record.

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::IdentityResult;
use crate::claims::filter::filter_claims;
use crate::claims::types::Claim;
use crate::storage::user::{User, UserStore};

/// Provisions and refreshes users on login.
///
/// No lock protects the find-then-write sequence; two concurrent first
/// logins for one `(provider, subject_id)` may both miss the lookup. The
/// store's `add` is a conditional write, so exactly one of them creates
/// the record and the loser retries through the update path.
pub struct UserLoginManager<S> {
    store: S,
}

impl<S: UserStore> UserLoginManager<S> {
    /// Creates a login manager over a user store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying user store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Finds or creates the user for an external login and records it.
    ///
    /// The claim set is normalized and replaces the stored set wholesale;
    /// name fields are re-derived from it. When `client_id` is known the
    /// per-client last-login timestamp is set to now.
    pub async fn user_login(
        &self,
        provider: &str,
        subject_id: &str,
        claims: &[Claim],
        client_id: Option<&str>,
    ) -> IdentityResult<User> {
        let filtered = filter_claims(claims);
        let now = OffsetDateTime::now_utc();

        if let Some(existing) = self.store.find_by_provider(provider, subject_id).await? {
            return self
                .refresh_user(existing, filtered, client_id, now)
                .await;
        }

        let mut user = User::new(provider, subject_id);
        user.apply_claims(filtered.clone());
        if let Some(client_id) = client_id {
            user.set_last_login_date_for_client(client_id, now);
        }

        match self.store.add(&user).await {
            Ok(created) => {
                info!(provider, subject_id, "provisioned new user");
                Ok(created)
            }
            Err(err) if err.is_already_exists() => {
                // Lost the race against a concurrent first login; the
                // record exists now, so fall through to the update path.
                debug!(provider, subject_id, "user created concurrently, updating instead");
                let existing = self
                    .store
                    .find_by_provider(provider, subject_id)
                    .await?
                    .ok_or(err)?;
                self.refresh_user(existing, filtered, client_id, now).await
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn refresh_user(
        &self,
        mut user: User,
        filtered_claims: Vec<Claim>,
        client_id: Option<&str>,
        now: OffsetDateTime,
    ) -> IdentityResult<User> {
        user.apply_claims(filtered_claims);
        if let Some(client_id) = client_id {
            user.set_last_login_date_for_client(client_id, now);
        }
        user.updated_at = now;

        self.store.update(&user).await?;
        debug!(
            provider = %user.provider_name,
            subject_id = %user.subject_id,
            "refreshed returning user"
        );
        Ok(user)
    }
}
