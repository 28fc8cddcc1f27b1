//! Authentication scheme strategies.
//!
//! Every provider-specific branch in the pipeline is decided here, once,
//! when the scheme item is resolved. Downstream code matches on
//! [`AuthScheme`] instead of re-comparing scheme strings.

use crate::claims::types::{Claim, claim_types, find_claim};
use crate::config::AzureAdConfig;
use crate::error::IdentityError;
use crate::{IdentityResult, claims::types::Principal};

/// Scheme string under which Azure AD logins arrive.
pub const AZURE_SCHEME: &str = "AzureActiveDirectory";

/// Scheme string under which integrated Windows logins arrive.
pub const WINDOWS_SCHEME: &str = "Windows";

/// The provider strategy for a login, resolved from the scheme item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// Azure AD: issuer gate applies, subject keyed by the object id claim.
    AzureAd,
    /// Integrated Windows authentication: directory enrichment keys off
    /// the principal name.
    Windows,
    /// Any other external provider: no issuer gate, subject claim used
    /// as-is.
    Generic,
}

impl AuthScheme {
    /// Resolves the strategy for a scheme item.
    ///
    /// The Azure strategy only activates when Azure integration is
    /// enabled; with it disabled the Azure scheme string is treated like
    /// any other provider.
    #[must_use]
    pub fn from_scheme_item(scheme_item: &str, azure_enabled: bool) -> Self {
        if azure_enabled && scheme_item == AZURE_SCHEME {
            Self::AzureAd
        } else if scheme_item == WINDOWS_SCHEME {
            Self::Windows
        } else {
            Self::Generic
        }
    }

    /// Returns the Azure AD object id claim value, for the Azure strategy
    /// only. Accepts both the short and the long-form claim type.
    #[must_use]
    pub fn azure_object_id<'a>(&self, claims: &'a [Claim]) -> Option<&'a str> {
        if *self != Self::AzureAd {
            return None;
        }
        find_claim(claims, claim_types::AZURE_OBJECT_ID)
            .or_else(|| find_claim(claims, claim_types::AZURE_OBJECT_ID_URI))
            .map(|c| c.value.as_str())
    }

    /// Returns the identifier to look the subject up by in the external
    /// directory, when this strategy supports directory enrichment.
    #[must_use]
    pub fn directory_subject<'a>(
        &self,
        principal: &'a Principal,
        claims: &'a [Claim],
    ) -> Option<&'a str> {
        match self {
            Self::Windows => principal.name.as_deref(),
            Self::AzureAd => self.azure_object_id(claims),
            Self::Generic => None,
        }
    }

    /// Enforces the issuer gate for this strategy.
    ///
    /// Only the Azure strategy validates issuers. The token must carry an
    /// issuer claim whose value is on the configured allow-list; a token
    /// without one, or with an unlisted issuer, is rejected outright.
    pub fn validate_issuer(&self, claims: &[Claim], azure: &AzureAdConfig) -> IdentityResult<()> {
        if *self != Self::AzureAd {
            return Ok(());
        }

        let Some(issuer_claim) = find_claim(claims, claim_types::ISSUER) else {
            return Err(IdentityError::MissingIssuerClaim);
        };

        if azure.is_issuer_allowed(&issuer_claim.value) {
            Ok(())
        } else {
            Err(IdentityError::invalid_issuer(
                issuer_claim.value.clone(),
                AZURE_SCHEME,
            ))
        }
    }
}
