//! Claim types and the request-scoped claims resolution result.
//!
//! External providers issue claims under a mix of short OIDC names and
//! long-form platform claim URIs; the constants and the outbound map here
//! define the canonical vocabulary everything downstream works with.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::scheme::AuthScheme;
use crate::storage::user::User;

/// Canonical and well-known external claim type names.
pub mod claim_types {
    /// Standard OIDC subject claim.
    pub const SUBJECT: &str = "sub";

    /// Industry-standard name identifier claim URI, used by providers that
    /// issue long-form claim types.
    pub const NAME_IDENTIFIER: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";

    /// Platform display-name claim URI, rewritten to [`NAME`] on filtering.
    pub const DISPLAY_NAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";

    /// Canonical OIDC display name claim.
    pub const NAME: &str = "name";

    /// Canonical OIDC given name claim.
    pub const GIVEN_NAME: &str = "given_name";

    /// Canonical OIDC family name claim.
    pub const FAMILY_NAME: &str = "family_name";

    /// Canonical OIDC middle name claim.
    pub const MIDDLE_NAME: &str = "middle_name";

    /// Canonical OIDC email claim.
    pub const EMAIL: &str = "email";

    /// Session id claim, carried over verbatim when the external system
    /// sends one.
    pub const SESSION_ID: &str = "sid";

    /// Group membership claim, carried over verbatim.
    pub const GROUPS: &str = "groups";

    /// Token issuer claim.
    pub const ISSUER: &str = "iss";

    /// Azure AD object identifier claim (short form).
    pub const AZURE_OBJECT_ID: &str = "oid";

    /// Azure AD object identifier claim (long-form URI alternative).
    pub const AZURE_OBJECT_ID_URI: &str =
        "http://schemas.microsoft.com/identity/claims/objectidentifier";
}

/// Maps a long-form platform claim type to its canonical OIDC equivalent.
///
/// Returns `None` when the type has no outbound mapping and should be
/// copied unchanged.
#[must_use]
pub fn outbound_claim_type(claim_type: &str) -> Option<&'static str> {
    const XMLSOAP: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/";

    let short = claim_type.strip_prefix(XMLSOAP)?;
    match short {
        "nameidentifier" => Some("nameid"),
        "givenname" => Some(claim_types::GIVEN_NAME),
        "surname" => Some(claim_types::FAMILY_NAME),
        "emailaddress" => Some(claim_types::EMAIL),
        "dateofbirth" => Some("birthdate"),
        "gender" => Some("gender"),
        "mobilephone" => Some("phone_number"),
        "webpage" => Some("website"),
        _ => None,
    }
}

/// A typed key/value assertion about an identity, with an issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// The claim type (canonical OIDC name or provider claim URI).
    #[serde(rename = "type")]
    pub claim_type: String,

    /// The claim value.
    pub value: String,

    /// The authority that issued the claim. Empty when unknown.
    #[serde(default)]
    pub issuer: String,
}

impl Claim {
    /// Creates a new claim with no issuer.
    #[must_use]
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            issuer: String::new(),
        }
    }

    /// Sets the issuer for this claim.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Returns `true` if this claim has the given type.
    #[must_use]
    pub fn is_type(&self, claim_type: &str) -> bool {
        self.claim_type == claim_type
    }
}

/// Returns the first claim of the given type, if any.
#[must_use]
pub fn find_claim<'a>(claims: &'a [Claim], claim_type: &str) -> Option<&'a Claim> {
    claims.iter().find(|c| c.is_type(claim_type))
}

/// Property key under which an identity-provider single-sign-out token is
/// preserved for later use during logout.
pub const ID_TOKEN_PROPERTY: &str = "id_token";

/// Metadata accompanying an external authentication result: string items
/// plus named token values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthProperties {
    /// Free-form string items (scheme, provider, ...).
    #[serde(default)]
    pub items: HashMap<String, String>,

    /// Named token values issued by the external provider.
    #[serde(default)]
    tokens: HashMap<String, String>,
}

impl AuthProperties {
    /// Creates empty properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates properties holding a single stored token.
    #[must_use]
    pub fn with_token(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut props = Self::default();
        props.store_token(name, value);
        props
    }

    /// Returns the item stored under `key`, if any.
    #[must_use]
    pub fn item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    /// Sets an item.
    pub fn set_item(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }

    /// Stores a named token value.
    pub fn store_token(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tokens.insert(name.into(), value.into());
    }

    /// Returns the token value stored under `name`, if any.
    #[must_use]
    pub fn get_token_value(&self, name: &str) -> Option<&str> {
        self.tokens.get(name).map(String::as_str)
    }
}

/// The authenticated principal delivered by the external provider.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Principal name as reported by the authentication layer (the OS
    /// account name for integrated auth). `None` when not provided.
    pub name: Option<String>,

    /// Claims asserted about the principal.
    pub claims: Vec<Claim>,
}

impl Principal {
    /// Creates a principal with the given claims and no name.
    #[must_use]
    pub fn new(claims: Vec<Claim>) -> Self {
        Self { name: None, claims }
    }

    /// Sets the principal name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// The raw result of an external authentication callback.
#[derive(Debug, Clone)]
pub struct ExternalAuthResult {
    /// The authenticated principal. `None` means authentication failed
    /// upstream and the login must be aborted.
    pub principal: Option<Principal>,

    /// Metadata items and tokens accompanying the result.
    pub properties: AuthProperties,
}

/// The authorization request context active for the login, when known.
#[derive(Debug, Clone)]
pub struct AuthorizationContext {
    /// The client application that initiated the login.
    pub client_id: String,
}

/// Canonical, filtered output of claims resolution for one login request.
///
/// Transient and request-scoped; never persisted.
#[derive(Debug, Clone)]
pub struct ClaimsResult {
    /// Client that initiated the login, when an authorization context was
    /// available.
    pub client_id: Option<String>,

    /// Value of the subject-identifying claim.
    pub user_id: String,

    /// Logical provider name recorded for the user record.
    pub provider: String,

    /// The scheme string under which authentication occurred. Related to
    /// but distinct from `provider`; both are retained.
    pub scheme_item: String,

    /// Provider strategy resolved from the scheme; decided once during
    /// resolution so accessors never re-derive security decisions.
    pub scheme: AuthScheme,

    /// The working claim set, with the subject-identifying claim removed.
    pub claims: Vec<Claim>,

    /// The claim that identified the subject.
    pub user_id_claim: Claim,

    /// Best-effort enrichment claims (session id, groups, directory
    /// profile fields).
    pub additional_claims: Vec<Claim>,

    /// Properties to persist on the session (single-sign-out token), if
    /// the provider issued any.
    pub authentication_properties: Option<AuthProperties>,
}

impl ClaimsResult {
    /// The user id to key the local account by, applying the same
    /// provider branching as resolution: the Azure AD object id when the
    /// Azure scheme is active, otherwise the subject claim value.
    #[must_use]
    pub fn effective_user_id(&self) -> &str {
        self.scheme
            .azure_object_id(&self.claims)
            .unwrap_or(&self.user_id)
    }

    /// The effective subject id for an already-provisioned user: the
    /// Azure AD object id when applicable, otherwise the user's stored
    /// subject id.
    #[must_use]
    pub fn effective_subject_id<'a>(&'a self, user: &'a User) -> &'a str {
        self.scheme
            .azure_object_id(&self.claims)
            .unwrap_or(&user.subject_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_construction() {
        let claim = Claim::new("sub", "u1").with_issuer("https://idp.example");
        assert_eq!(claim.claim_type, "sub");
        assert_eq!(claim.value, "u1");
        assert_eq!(claim.issuer, "https://idp.example");
        assert!(claim.is_type(claim_types::SUBJECT));
    }

    #[test]
    fn test_claim_serialization_uses_type_field() {
        let claim = Claim::new("email", "ann@example.com");
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["type"], "email");
        assert_eq!(json["value"], "ann@example.com");

        let parsed: Claim = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, claim);
    }

    #[test]
    fn test_find_claim() {
        let claims = vec![Claim::new("sub", "u1"), Claim::new("email", "a@b.c")];
        assert_eq!(find_claim(&claims, "email").unwrap().value, "a@b.c");
        assert!(find_claim(&claims, "groups").is_none());
    }

    #[test]
    fn test_outbound_claim_type() {
        assert_eq!(
            outbound_claim_type("http://schemas.xmlsoap.org/ws/2005/05/identity/claims/givenname"),
            Some("given_name")
        );
        assert_eq!(
            outbound_claim_type("http://schemas.xmlsoap.org/ws/2005/05/identity/claims/surname"),
            Some("family_name")
        );
        assert_eq!(
            outbound_claim_type(
                "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress"
            ),
            Some("email")
        );
        assert_eq!(outbound_claim_type("given_name"), None);
        assert_eq!(outbound_claim_type("custom-claim"), None);
    }

    #[test]
    fn test_auth_properties_tokens() {
        let mut props = AuthProperties::new();
        assert!(props.get_token_value(ID_TOKEN_PROPERTY).is_none());

        props.store_token(ID_TOKEN_PROPERTY, "token-value");
        assert_eq!(
            props.get_token_value(ID_TOKEN_PROPERTY),
            Some("token-value")
        );

        let props = AuthProperties::with_token(ID_TOKEN_PROPERTY, "t");
        assert_eq!(props.get_token_value(ID_TOKEN_PROPERTY), Some("t"));
    }

    #[test]
    fn test_auth_properties_items() {
        let mut props = AuthProperties::new();
        props.set_item("scheme", "Windows");
        assert_eq!(props.item("scheme"), Some("Windows"));
        assert!(props.item("provider").is_none());
    }

    #[test]
    fn test_effective_user_id_generic_scheme() {
        let result = ClaimsResult {
            client_id: None,
            user_id: "u1".to_string(),
            provider: "corp".to_string(),
            scheme_item: "corp".to_string(),
            scheme: AuthScheme::Generic,
            claims: vec![Claim::new(claim_types::AZURE_OBJECT_ID, "azure-oid")],
            user_id_claim: Claim::new("sub", "u1"),
            additional_claims: Vec::new(),
            authentication_properties: None,
        };

        // Generic scheme never consults the Azure object id claim.
        assert_eq!(result.effective_user_id(), "u1");
    }

    #[test]
    fn test_effective_user_id_azure_scheme() {
        let result = ClaimsResult {
            client_id: None,
            user_id: "u1".to_string(),
            provider: "AzureActiveDirectory".to_string(),
            scheme_item: "AzureActiveDirectory".to_string(),
            scheme: AuthScheme::AzureAd,
            claims: vec![Claim::new(claim_types::AZURE_OBJECT_ID, "azure-oid")],
            user_id_claim: Claim::new("sub", "u1"),
            additional_claims: Vec::new(),
            authentication_properties: None,
        };

        assert_eq!(result.effective_user_id(), "azure-oid");
    }

    #[test]
    fn test_effective_subject_id_falls_back_to_stored_subject() {
        let result = ClaimsResult {
            client_id: None,
            user_id: "u1".to_string(),
            provider: "corp".to_string(),
            scheme_item: "corp".to_string(),
            scheme: AuthScheme::Generic,
            claims: Vec::new(),
            user_id_claim: Claim::new("sub", "u1"),
            additional_claims: Vec::new(),
            authentication_properties: None,
        };
        let user = User::new("corp", "stored-subject");

        assert_eq!(result.effective_subject_id(&user), "stored-subject");
    }
}
