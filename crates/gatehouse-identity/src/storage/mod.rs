//! Repository contracts and the records they store.
//!
//! Backends implement these traits in their own crates; the pipeline
//! only ever sees the traits.

pub mod cors;
pub mod resource;
pub mod user;

pub use cors::{ALLOWED_ORIGINS_KEY, ClientOriginList, CorsPolicy};
pub use resource::{
    ApiResource, ApiScope, IdentityResource, ResourceStore, Resources, Secret,
};
pub use user::{SearchKind, User, UserStore};
