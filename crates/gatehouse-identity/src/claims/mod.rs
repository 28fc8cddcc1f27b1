//! Claims resolution: canonical claim vocabulary, scheme strategies,
//! normalization, and the resolver itself.

pub mod filter;
pub mod resolver;
pub mod scheme;
pub mod types;

pub use filter::filter_claims;
pub use resolver::ClaimsResolver;
pub use scheme::{AZURE_SCHEME, AuthScheme, WINDOWS_SCHEME};
pub use types::{
    AuthProperties, AuthorizationContext, Claim, ClaimsResult, ExternalAuthResult,
    ID_TOKEN_PROPERTY, Principal, claim_types, find_claim, outbound_claim_type,
};
