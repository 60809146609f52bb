//! Conversions from external infrastructure errors into transport errors.

use bridgekit_core::{TransportError, TransportErrorKind};
use reqwest::header::{InvalidHeaderName, InvalidHeaderValue};
use reqwest::Error as HttpError;
use thiserror::Error;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the core transport error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(pub TransportError);

impl From<InfraError> for TransportError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TransportError> for InfraError {
    fn from(value: TransportError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoTransportError {
    fn into_transport(self) -> TransportError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError */
/* -------------------------------------------------------------------------- */

impl IntoTransportError for HttpError {
    fn into_transport(self) -> TransportError {
        if self.is_timeout() {
            return TransportError::new(TransportErrorKind::Timeout, "HTTP request timed out");
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return TransportError::new(
                TransportErrorKind::Connect,
                format!("HTTP connection failure: {self}"),
            );
        }

        if self.is_builder() {
            return TransportError::new(TransportErrorKind::Build, self.to_string());
        }

        if self.is_body() || self.is_decode() {
            return TransportError::new(TransportErrorKind::Body, self.to_string());
        }

        TransportError::new(TransportErrorKind::Request, self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_transport())
    }
}

/* -------------------------------------------------------------------------- */
/* header construction errors → TransportError */
/* -------------------------------------------------------------------------- */

impl From<InvalidHeaderName> for InfraError {
    fn from(value: InvalidHeaderName) -> Self {
        Self(TransportError::build(format!("invalid header name: {value}")))
    }
}

impl From<InvalidHeaderValue> for InfraError {
    fn from(value: InvalidHeaderValue) -> Self {
        Self(TransportError::build(format!("invalid header value: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
