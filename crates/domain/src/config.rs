//! Configuration structures
//!
//! Loaded by `bridgekit_infra::config` from environment variables or a
//! JSON/TOML file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONNECTIVITY_MAX_ATTEMPTS, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SESSION_TTL_SECS,
};
use crate::errors::{ConfigError, ConfigResult};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub authentication: AuthenticationConfig,
    #[serde(default)]
    pub api_client: ApiClientSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        self.authentication.validate()?;
        self.api_client.validate()
    }
}

/// Login endpoints and session/transport timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationConfig {
    pub session_auth_url: String,
    #[serde(default)]
    pub key_manager_auth_url: Option<String>,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Extra root certificates trusted when connecting to login and API hosts.
    #[serde(default)]
    pub trust_store: Option<TrustStoreConfig>,
}

impl AuthenticationConfig {
    pub fn new(session_auth_url: impl Into<String>) -> Self {
        Self {
            session_auth_url: session_auth_url.into(),
            key_manager_auth_url: None,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            trust_store: None,
        }
    }

    #[must_use]
    pub fn with_trust_store(mut self, trust_store: TrustStoreConfig) -> Self {
        self.trust_store = Some(trust_store);
        self
    }

    #[must_use]
    pub fn with_key_manager_auth_url(mut self, url: impl Into<String>) -> Self {
        self.key_manager_auth_url = Some(url.into());
        self
    }

    pub const fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.session_auth_url.trim().is_empty() {
            return Err(ConfigError::Missing("authentication.session_auth_url".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "authentication.request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.trust_store.as_ref().is_some_and(|store| store.file.trim().is_empty()) {
            return Err(ConfigError::Missing("authentication.trust_store.file".into()));
        }
        Ok(())
    }
}

/// Encoding of a trust store file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustStoreFormat {
    /// One or more PEM certificates.
    #[default]
    Pem,
    /// A single DER certificate.
    Der,
}

/// Root certificates added on top of the system roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustStoreConfig {
    pub file: String,
    #[serde(default)]
    pub format: TrustStoreFormat,
}

impl TrustStoreConfig {
    pub fn pem(file: impl Into<String>) -> Self {
        Self { file: file.into(), format: TrustStoreFormat::Pem }
    }
}

/// Decorated client tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiClientSettings {
    /// Total attempts made by the connectivity decorator, first try included.
    #[serde(default = "default_connectivity_max_attempts")]
    pub connectivity_max_attempts: u32,
}

impl Default for ApiClientSettings {
    fn default() -> Self {
        Self { connectivity_max_attempts: DEFAULT_CONNECTIVITY_MAX_ATTEMPTS }
    }
}

impl ApiClientSettings {
    fn validate(&self) -> ConfigResult<()> {
        if self.connectivity_max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "api_client.connectivity_max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Logging setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

/// Settings of one OAuth1 third-party integration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Settings {
    pub consumer_key: String,
    /// RSA private key, PEM or base64-encoded PKCS#8 DER.
    pub private_key: String,
    pub request_temporary_token_url: String,
    pub authorization_callback_url: String,
    pub authorize_temporary_token_url: String,
    pub request_access_token_url: String,
}

impl std::fmt::Debug for OAuth1Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Settings")
            .field("consumer_key", &self.consumer_key)
            .field("private_key", &"<redacted>")
            .field("request_temporary_token_url", &self.request_temporary_token_url)
            .field("authorization_callback_url", &self.authorization_callback_url)
            .field("authorize_temporary_token_url", &self.authorize_temporary_token_url)
            .field("request_access_token_url", &self.request_access_token_url)
            .finish()
    }
}

const fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_connectivity_max_attempts() -> u32 {
    DEFAULT_CONNECTIVITY_MAX_ATTEMPTS
}

fn default_log_level() -> String {
    "info".to_string()
}
