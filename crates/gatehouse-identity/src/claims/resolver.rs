//! Claims resolution for external logins.
//!
//! The resolver turns the raw callback result from an external provider
//! into a canonical [`ClaimsResult`]: subject identified, issuer gate
//! enforced, enrichment claims gathered. It performs no writes; user
//! provisioning happens afterwards in
//! [`UserLoginManager`](crate::provisioning::UserLoginManager).

use tracing::{debug, warn};

use crate::IdentityResult;
use crate::claims::scheme::AuthScheme;
use crate::claims::types::{
    AuthorizationContext, Claim, ClaimsResult, ExternalAuthResult, ID_TOKEN_PROPERTY, claim_types,
};
use crate::config::AzureAdConfig;
use crate::directory::DirectoryService;
use crate::error::IdentityError;

/// Property item keys populated by the authentication layer.
const SCHEME_ITEM: &str = "scheme";
const PROVIDER_ITEM: &str = "provider";

/// Resolves external authentication results into canonical claim sets.
pub struct ClaimsResolver<D> {
    azure: AzureAdConfig,
    directory: D,
}

impl<D: DirectoryService> ClaimsResolver<D> {
    /// Creates a resolver with the given Azure settings and directory
    /// service.
    pub fn new(azure: AzureAdConfig, directory: D) -> Self {
        Self { azure, directory }
    }

    /// Resolves the raw result of an external authentication callback.
    ///
    /// Fails with [`IdentityError::ExternalAuthentication`] when no
    /// authenticated principal is present, and with
    /// [`IdentityError::MissingSubjectClaim`] when no subject-identifying
    /// claim exists. The Azure issuer gate applies when the Azure scheme
    /// is active. Directory lookups are best-effort; their failures are
    /// logged and swallowed.
    pub async fn resolve(
        &self,
        result: &ExternalAuthResult,
        context: Option<&AuthorizationContext>,
    ) -> IdentityResult<ClaimsResult> {
        let Some(principal) = &result.principal else {
            return Err(IdentityError::ExternalAuthentication);
        };

        let Some(scheme_item) = result.properties.item(SCHEME_ITEM) else {
            return Err(IdentityError::ExternalAuthentication);
        };
        let provider = result
            .properties
            .item(PROVIDER_ITEM)
            .unwrap_or(scheme_item);

        // The subject claim is promoted to the user id; it is removed from
        // the working set so it never reappears as a generic claim.
        let (user_id_claim, claims) = split_user_id_claim(&principal.claims)?;
        let user_id = user_id_claim.value.clone();

        let scheme = AuthScheme::from_scheme_item(scheme_item, self.azure.enabled);
        scheme.validate_issuer(&claims, &self.azure)?;

        let mut additional_claims = Vec::new();
        if let Some(sid) = crate::claims::types::find_claim(&claims, claim_types::SESSION_ID) {
            additional_claims.push(sid.clone());
        }
        additional_claims.extend(
            claims
                .iter()
                .filter(|c| c.is_type(claim_types::GROUPS))
                .cloned(),
        );

        if let Some(subject) = scheme.directory_subject(principal, &claims) {
            self.enrich_from_directory(subject, &mut additional_claims)
                .await;
        }

        let authentication_properties = result
            .properties
            .get_token_value(ID_TOKEN_PROPERTY)
            .map(|token| crate::claims::types::AuthProperties::with_token(ID_TOKEN_PROPERTY, token));

        Ok(ClaimsResult {
            client_id: context.map(|c| c.client_id.clone()),
            user_id,
            provider: provider.to_string(),
            scheme_item: scheme_item.to_string(),
            scheme,
            claims,
            user_id_claim,
            additional_claims,
            authentication_properties,
        })
    }

    async fn enrich_from_directory(&self, subject: &str, additional_claims: &mut Vec<Claim>) {
        match self.directory.find_user_by_subject_id(subject).await {
            Ok(Some(profile)) => {
                debug!(subject, "directory profile found, enriching claims");
                let fields = [
                    (claim_types::GIVEN_NAME, profile.first_name),
                    (claim_types::FAMILY_NAME, profile.last_name),
                    (claim_types::MIDDLE_NAME, profile.middle_name),
                    (claim_types::EMAIL, profile.email),
                ];
                for (claim_type, value) in fields {
                    if let Some(value) = value {
                        additional_claims.push(Claim::new(claim_type, value));
                    }
                }
            }
            Ok(None) => {
                debug!(subject, "no directory profile for subject");
            }
            Err(error) => {
                // Enrichment is best-effort; a failing directory never
                // aborts the login.
                warn!(subject, %error, "directory lookup failed, skipping enrichment");
            }
        }
    }
}

/// Finds the subject-identifying claim and returns it alongside the
/// remaining claims.
fn split_user_id_claim(claims: &[Claim]) -> IdentityResult<(Claim, Vec<Claim>)> {
    let position = claims
        .iter()
        .position(|c| c.is_type(claim_types::SUBJECT))
        .or_else(|| {
            claims
                .iter()
                .position(|c| c.is_type(claim_types::NAME_IDENTIFIER))
        })
        .ok_or(IdentityError::MissingSubjectClaim)?;

    let mut remaining = claims.to_vec();
    let user_id_claim = remaining.remove(position);
    Ok((user_id_claim, remaining))
}
