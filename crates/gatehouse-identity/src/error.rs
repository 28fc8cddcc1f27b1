//! Identity pipeline error types.
//!
//! This module defines all error types that can occur during claims
//! resolution and user provisioning.

use std::fmt;

use gatehouse_storage::StorageError;

/// Errors that can occur during claims resolution and user provisioning.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The external authentication result carried no authenticated
    /// principal. Fatal to the login attempt.
    #[error("External authentication error")]
    ExternalAuthentication,

    /// No claim identifying the external subject was found.
    ///
    /// The resolver accepts either a standard subject claim or a name
    /// identifier claim; without one of them the user cannot be keyed.
    #[error("No subject-identifying claim was found in the external assertion")]
    MissingSubjectClaim,

    /// The external token carries no issuer claim but the active scheme
    /// requires issuer validation.
    #[error("The external token does not contain an issuer claim")]
    MissingIssuerClaim,

    /// The external token's issuer is not in the configured allow-list.
    ///
    /// Unlisted issuers must never be trusted even if the claims are
    /// otherwise well-formed.
    #[error("Issuer is not allowed for scheme {scheme}")]
    InvalidIssuer {
        /// The rejected issuer value.
        issuer: String,
        /// The authentication scheme under which the token was presented.
        scheme: String,
    },

    /// A storage operation failed while provisioning or looking up a user.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The identity configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl IdentityError {
    /// Creates a new `InvalidIssuer` error.
    #[must_use]
    pub fn invalid_issuer(issuer: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self::InvalidIssuer {
            issuer: issuer.into(),
            scheme: scheme.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns `true` if this error aborts the login attempt.
    ///
    /// Authentication-flow errors surface as a generic authentication
    /// failure to the end user, with no internal detail leaked.
    #[must_use]
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            Self::ExternalAuthentication
                | Self::MissingSubjectClaim
                | Self::MissingIssuerClaim
                | Self::InvalidIssuer { .. }
        )
    }

    /// Returns `true` if this is a security gate violation from the
    /// external provider.
    #[must_use]
    pub fn is_security_violation(&self) -> bool {
        matches!(self, Self::MissingIssuerClaim | Self::InvalidIssuer { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ExternalAuthentication | Self::MissingSubjectClaim => {
                ErrorCategory::Authentication
            }
            Self::MissingIssuerClaim | Self::InvalidIssuer { .. } => ErrorCategory::Security,
            Self::Storage(_) => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
        }
    }
}

/// Categories of identity errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Authentication-flow errors (identity verification).
    Authentication,
    /// Security gate violations (issuer validation).
    Security,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Security => write!(f, "security"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IdentityError::ExternalAuthentication;
        assert_eq!(err.to_string(), "External authentication error");

        let err = IdentityError::invalid_issuer("https://sts.evil.example", "AzureActiveDirectory");
        assert_eq!(
            err.to_string(),
            "Issuer is not allowed for scheme AzureActiveDirectory"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(IdentityError::ExternalAuthentication.is_authentication_error());
        assert!(IdentityError::MissingSubjectClaim.is_authentication_error());
        assert!(IdentityError::MissingIssuerClaim.is_authentication_error());
        assert!(!IdentityError::ExternalAuthentication.is_security_violation());
        assert!(IdentityError::MissingIssuerClaim.is_security_violation());
        assert!(IdentityError::invalid_issuer("x", "y").is_security_violation());

        let err = IdentityError::Storage(StorageError::connection("down"));
        assert!(!err.is_authentication_error());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            IdentityError::MissingSubjectClaim.category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            IdentityError::invalid_issuer("x", "y").category(),
            ErrorCategory::Security
        );
        assert_eq!(
            IdentityError::Storage(StorageError::internal("bug")).category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(
            IdentityError::configuration("bad").category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn test_storage_error_conversion() {
        let storage = StorageError::already_exists("user", "u1:okta");
        let err = IdentityError::from(storage);
        assert!(matches!(err, IdentityError::Storage(_)));
    }
}
