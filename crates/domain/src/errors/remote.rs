//! Typed result of a failed remote call
//!
//! Every failure leaving the base caller is exactly one [`RemoteApiError`]:
//! either an HTTP status returned by the service or the connection-error
//! sentinel when no response was obtained.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use super::format::format_error_message_with_solutions;

const CONNECTION_ERROR: &str = "connection-error";

/// HTTP-equivalent status of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpStatus {
    /// Status code returned by the remote service.
    Code(u16),
    /// No response was obtained.
    ConnectionError,
}

impl HttpStatus {
    pub const fn code(self) -> Option<u16> {
        match self {
            Self::Code(code) => Some(code),
            Self::ConnectionError => None,
        }
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::ConnectionError => f.write_str(CONNECTION_ERROR),
        }
    }
}

impl Serialize for HttpStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Code(code) => serializer.serialize_u16(*code),
            Self::ConnectionError => serializer.serialize_str(CONNECTION_ERROR),
        }
    }
}

/// Check whether a status code is authorization-class (401/403).
pub const fn is_authorization_status(code: u16) -> bool {
    matches!(code, 401 | 403)
}

/// Failure taxonomy of the decorated client pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// No response obtained; retried by the connectivity decorator.
    ConnectionFailure,
    /// 401/403; triggers one re-authentication retry.
    AuthorizationFailure,
    /// Any other non-2xx; surfaced immediately.
    RemoteService,
}

/// Error payload surfaced to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub component: String,
    pub http_status: HttpStatus,
    pub message: String,
}

/// Failure of a remote call, tagged with the component that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", format_error_message_with_solutions(.component, .message, .solutions))]
pub struct RemoteApiError {
    component: String,
    status: HttpStatus,
    message: String,
    solutions: Vec<String>,
}

impl RemoteApiError {
    /// Error for a non-2xx response.
    pub fn from_status(component: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HttpStatus::Code(status),
            message: message.into(),
            solutions: Vec::new(),
        }
    }

    /// Error for a call that never obtained a response.
    pub fn connection(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HttpStatus::ConnectionError,
            message: message.into(),
            solutions: Vec::new(),
        }
    }

    /// Attach remediation hints rendered in the `Solutions:` block.
    #[must_use]
    pub fn with_solutions<I, S>(mut self, solutions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.solutions = solutions.into_iter().map(Into::into).collect();
        self
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub const fn status(&self) -> HttpStatus {
        self.status
    }

    /// Status code, or `None` for connection failures.
    pub const fn status_code(&self) -> Option<u16> {
        self.status.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn solutions(&self) -> &[String] {
        &self.solutions
    }

    pub const fn kind(&self) -> RemoteErrorKind {
        match self.status {
            HttpStatus::ConnectionError => RemoteErrorKind::ConnectionFailure,
            HttpStatus::Code(code) if is_authorization_status(code) => {
                RemoteErrorKind::AuthorizationFailure
            }
            HttpStatus::Code(_) => RemoteErrorKind::RemoteService,
        }
    }

    pub const fn is_connection_failure(&self) -> bool {
        matches!(self.kind(), RemoteErrorKind::ConnectionFailure)
    }

    pub const fn is_authorization_failure(&self) -> bool {
        matches!(self.kind(), RemoteErrorKind::AuthorizationFailure)
    }

    /// Payload shape surfaced to collaborators.
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            component: self.component.clone(),
            http_status: self.status,
            message: self.message.clone(),
        }
    }
}
