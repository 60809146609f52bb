//! Authentication Proxy errors

use thiserror::Error;

use super::format::format_error_message_with_solutions;
use crate::constants::AUTHENTICATION_PROXY_COMPONENT;

/// Coarse classification of [`AuthenticationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationErrorKind {
    /// Credential invalid, unregistered, or login rejected.
    AuthenticationFailure,
    /// No session stored for the requested user.
    NotAuthenticated,
}

/// Failures raised by the Authentication Proxy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
    #[error("{}", render(&format!("User {user_id} has no registered credential"), &[
        "Register the user keystore before authenticating",
    ]))]
    UnregisteredUser { user_id: String },

    #[error("{}", render(&format!("Credential for user {user_id} is invalid: {reason}"), &[
        "Verify the keystore format and password",
    ]))]
    InvalidCredential { user_id: String, reason: String },

    #[error("{}", render(&format!("Login rejected for user {user_id} (status {status}): {reason}"), &[
        "Verify the user certificate is trusted by the backend",
        "Verify the service user exists and is active",
    ]))]
    LoginRejected { user_id: String, status: u16, reason: String },

    #[error("{}", render(&format!("Login failed for user {user_id}: {reason}"), &[
        "Verify connectivity to the authentication endpoints",
    ]))]
    LoginFailed { user_id: String, reason: String },

    #[error("{}", render(&format!("User {user_id} is not authenticated"), &[
        "Authenticate the user before requesting its session",
    ]))]
    NotAuthenticated { user_id: String },
}

fn render(message: &str, solutions: &[&str]) -> String {
    format_error_message_with_solutions(AUTHENTICATION_PROXY_COMPONENT, message, solutions)
}

impl AuthenticationError {
    pub const fn kind(&self) -> AuthenticationErrorKind {
        match self {
            Self::NotAuthenticated { .. } => AuthenticationErrorKind::NotAuthenticated,
            Self::UnregisteredUser { .. }
            | Self::InvalidCredential { .. }
            | Self::LoginRejected { .. }
            | Self::LoginFailed { .. } => AuthenticationErrorKind::AuthenticationFailure,
        }
    }

    pub const fn component(&self) -> &'static str {
        AUTHENTICATION_PROXY_COMPONENT
    }

    /// User the failure refers to.
    pub fn user_id(&self) -> &str {
        match self {
            Self::UnregisteredUser { user_id }
            | Self::InvalidCredential { user_id, .. }
            | Self::LoginRejected { user_id, .. }
            | Self::LoginFailed { user_id, .. }
            | Self::NotAuthenticated { user_id } => user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_split_failure_from_missing_session() {
        let missing = AuthenticationError::NotAuthenticated { user_id: "u".into() };
        assert_eq!(missing.kind(), AuthenticationErrorKind::NotAuthenticated);

        let rejected =
            AuthenticationError::LoginRejected { user_id: "u".into(), status: 401, reason: "no".into() };
        assert_eq!(rejected.kind(), AuthenticationErrorKind::AuthenticationFailure);
        assert_eq!(rejected.user_id(), "u");
    }

    #[test]
    fn message_names_component_and_solutions() {
        let err = AuthenticationError::UnregisteredUser { user_id: "jira".into() };
        let rendered = err.to_string();

        assert!(rendered.starts_with("\nComponent: Authentication Proxy\n"));
        assert!(rendered.contains("Message: User jira has no registered credential\n"));
        assert!(rendered.contains("Register the user keystore before authenticating"));
    }
}
