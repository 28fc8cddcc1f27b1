//! Claim normalization.
//!
//! External providers issue a mix of canonical OIDC claim names and
//! long-form platform claim URIs. Filtering rewrites everything to the
//! canonical vocabulary and makes sure a display name claim exists.

use crate::claims::types::{Claim, claim_types, find_claim, outbound_claim_type};

/// Normalizes a raw external claim set.
///
/// Long-form claim types are rewritten to their canonical OIDC names and
/// a `name` claim is synthesized from the given/family name claims when
/// the provider did not send one. Claim order is otherwise preserved.
/// Filtering an already-filtered set is a no-op.
#[must_use]
pub fn filter_claims(claims: &[Claim]) -> Vec<Claim> {
    let mut filtered: Vec<Claim> = Vec::with_capacity(claims.len() + 1);

    for claim in claims {
        if claim.is_type(claim_types::DISPLAY_NAME) {
            let mut renamed = claim.clone();
            renamed.claim_type = claim_types::NAME.to_string();
            filtered.push(renamed);
        } else if let Some(canonical) = outbound_claim_type(&claim.claim_type) {
            let mut renamed = claim.clone();
            renamed.claim_type = canonical.to_string();
            filtered.push(renamed);
        } else {
            filtered.push(claim.clone());
        }
    }

    if find_claim(&filtered, claim_types::NAME).is_none() {
        let given = find_claim(&filtered, claim_types::GIVEN_NAME).map(|c| c.value.clone());
        let family = find_claim(&filtered, claim_types::FAMILY_NAME).map(|c| c.value.clone());

        let name = match (given, family) {
            (Some(given), Some(family)) => Some(format!("{given} {family}")),
            (Some(given), None) => Some(given),
            (None, Some(family)) => Some(family),
            (None, None) => None,
        };

        if let Some(name) = name {
            filtered.push(Claim::new(claim_types::NAME, name));
        }
    }

    filtered
}
