//! OAuth1 provider and authorized integration errors

use thiserror::Error;

use super::format::format_error_message;
use crate::constants::{AUTHORIZATION_COMPONENT, OAUTH1_COMPONENT};

/// Failures raised by an OAuth1 provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OAuth1Error {
    /// The provider was built without valid settings.
    #[error("{}", format_error_message(OAUTH1_COMPONENT, "OAuth1 provider is not configured"))]
    NotConfigured,

    /// Signing, transport or parsing failure during the handshake.
    #[error("{}", format_error_message(OAUTH1_COMPONENT, .message))]
    Failure { message: String },

    /// The third party answered a signed call with a non-2xx status.
    #[error("{}", format_error_message(OAUTH1_COMPONENT, .message))]
    HttpRequest { code: u16, message: String },
}

impl OAuth1Error {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure { message: message.into() }
    }

    pub fn http_request(code: u16, message: impl Into<String>) -> Self {
        Self::HttpRequest { code, message: message.into() }
    }

    /// Status code returned by the third party, if any.
    pub const fn code(&self) -> Option<u16> {
        match self {
            Self::HttpRequest { code, .. } => Some(*code),
            Self::NotConfigured | Self::Failure { .. } => None,
        }
    }

    pub const fn component(&self) -> &'static str {
        OAUTH1_COMPONENT
    }
}

/// Failures raised by an authorized integration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("{}", format_error_message(AUTHORIZATION_COMPONENT, &format!("Missing callback parameter: {parameter}")))]
    MissingParameter { parameter: String },

    #[error("{}", format_error_message(AUTHORIZATION_COMPONENT, &format!("Unknown temporary token: {token}")))]
    UnknownTemporaryToken { token: String },

    #[error("{}", format_error_message(AUTHORIZATION_COMPONENT, &format!("User {user_id} is not authorized for {url}")))]
    UserNotAuthorized { user_id: i64, url: String },

    #[error(transparent)]
    OAuth1(#[from] OAuth1Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_request_error_keeps_code_and_formats_message() {
        let err = OAuth1Error::http_request(400, "Invalid parameters");

        assert_eq!(err.code(), Some(400));
        assert_eq!(
            err.to_string(),
            format_error_message("Third-party integration/app authorization.", "Invalid parameters")
        );
    }

    #[test]
    fn not_configured_has_no_code() {
        assert_eq!(OAuth1Error::NotConfigured.code(), None);
        assert!(OAuth1Error::NotConfigured.to_string().contains("not configured"));
    }

    #[test]
    fn authorization_error_wraps_oauth_failures() {
        let err: AuthorizationError = OAuth1Error::failure("signature").into();
        assert!(matches!(err, AuthorizationError::OAuth1(OAuth1Error::Failure { .. })));
    }
}
