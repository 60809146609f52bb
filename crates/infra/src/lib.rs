//! # Bridgekit Infrastructure
//!
//! Implementations of the `bridgekit-core` ports.
//!
//! This crate contains:
//! - The reqwest transport with per-user TLS identities
//! - The session Authentication Proxy
//! - The decorated API client pipeline and its builder
//! - The OAuth1 provider and the OAuth1 authorized integration
//! - Configuration loading, logging setup and API call metrics
//!
//! ## Architecture
//! - Implements traits defined in `bridgekit-core`
//! - Depends on `bridgekit-domain` and `bridgekit-core`
//! - Contains all I/O

pub mod api;
pub mod auth;
pub mod authorization;
pub mod config;
pub mod errors;
pub mod http;
pub mod oauth1;
pub mod observability;

// Re-export commonly used items
pub use api::{
    ApiClientBuilder, AuthenticationProxyApiClient, ConnectivityApiClient, MetricsApiClient,
    ReAuthenticationApiClient, TraceApiClient,
};
pub use auth::SessionAuthenticationProxy;
pub use authorization::OAuth1AuthorizedIntegration;
pub use errors::InfraError;
pub use http::{ReqwestTransport, ReqwestTransportBuilder, ReqwestTransportFactory};
pub use oauth1::{OAuth1Provider, OAuthRsaSignerFactory};
pub use observability::{init_logging, ApiMetricsController};
