//! Core identity pipeline for the Gatehouse identity provider.
//!
//! This crate turns external authentication results into locally
//! provisioned users and defines the metadata contracts the token
//! issuance layer reads:
//!
//! - [`claims`] - claim vocabulary, scheme strategies, normalization, and
//!   the [`ClaimsResolver`](claims::ClaimsResolver)
//! - [`provisioning`] - the find-or-create
//!   [`UserLoginManager`](provisioning::UserLoginManager)
//! - [`storage`] - repository traits for users, resources, and the CORS
//!   allow-list; implemented by the backend crates
//! - [`directory`] - best-effort external directory enrichment
//! - [`outcome`] - structured outcomes for administrative CRUD
//!
//! # Pipeline
//!
//! A login flows through two stages: the resolver produces a canonical
//! [`ClaimsResult`](claims::ClaimsResult) (subject identified, issuer
//! gate enforced, enrichment claims gathered), then the login manager
//! persists a [`User`](storage::User) from it. Resolution never writes;
//! provisioning never makes security decisions.

pub mod claims;
pub mod config;
pub mod directory;
pub mod error;
pub mod outcome;
pub mod provisioning;
pub mod storage;

pub use claims::{ClaimsResolver, ClaimsResult, filter_claims};
pub use config::{AzureAdConfig, IdentityConfig, StorageBackend};
pub use directory::{DirectoryService, DirectoryUser};
pub use error::{ErrorCategory, IdentityError};
pub use outcome::{AdminOutcome, create_outcome, delete_outcome};
pub use provisioning::UserLoginManager;
pub use storage::{ResourceStore, User, UserStore};

/// Type alias for identity pipeline results.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use gatehouse_identity::prelude::*;
/// ```
pub mod prelude {
    pub use crate::IdentityResult;
    pub use crate::claims::{
        AuthProperties, AuthorizationContext, Claim, ClaimsResolver, ClaimsResult,
        ExternalAuthResult, Principal, claim_types, filter_claims, find_claim,
    };
    pub use crate::config::{AzureAdConfig, IdentityConfig, StorageBackend};
    pub use crate::directory::{DirectoryService, DirectoryUser, NoopDirectoryService};
    pub use crate::error::{ErrorCategory, IdentityError};
    pub use crate::outcome::{AdminOutcome, create_outcome, delete_outcome};
    pub use crate::provisioning::UserLoginManager;
    pub use crate::storage::{
        ApiResource, ApiScope, ClientOriginList, CorsPolicy, IdentityResource, ResourceStore,
        Resources, Secret, User, UserStore,
    };
}
