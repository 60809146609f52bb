//! Error types used throughout Bridgekit
//!
//! Each error carries the name of the component that raised it and renders
//! through [`format_error_message`], so every failure reads the same way in
//! logs regardless of where it came from.

mod authentication;
mod format;
mod oauth;
mod remote;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use authentication::{AuthenticationError, AuthenticationErrorKind};
pub use format::{format_error_message, format_error_message_with_solutions};
pub use oauth::{AuthorizationError, OAuth1Error};
pub use remote::{
    is_authorization_status, ErrorPayload, HttpStatus, RemoteApiError, RemoteErrorKind,
};

/// Configuration loading and validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    Missing(String),

    #[error("Invalid configuration value: {0}")]
    Invalid(String),

    #[error("Configuration file error: {0}")]
    File(String),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
