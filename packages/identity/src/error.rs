//! Error types for the identity core.

use thiserror::Error;

/// Failures reported by an [`IdentityProvider`](crate::IdentityProvider) or by a
/// server-side access check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No session exists. Not a failure from the store's point of view: it resolves to
    /// the anonymous state.
    #[error("No active session")]
    NoSession,

    /// Network or provider failure. Also resolves to the anonymous state.
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The caller lacks the required role. Deliberately carries no detail.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The provider refused the request for a reason it wants shown to the user.
    #[error("{0}")]
    Rejected(String),
}

impl AuthError {
    /// Whether this error simply means "nobody is signed in".
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::NoSession)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error("An auth listener is already registered for this session store")]
    AlreadyRegistered,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("Profile record is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Profile record field `{field}` has an unusable value: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_missing_session_is_anonymous() {
        assert!(AuthError::NoSession.is_anonymous());
        assert!(!AuthError::ProviderUnavailable("timeout".to_string()).is_anonymous());
        assert!(!AuthError::Unauthorized.is_anonymous());
        assert_eq!(AuthError::Unauthorized.to_string(), "Unauthorized");
    }
}
