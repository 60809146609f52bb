//! Decorated API clients
//!
//! Each layer implements [`bridgekit_core::HttpApiClient`] and wraps the
//! next one. [`ApiClientBuilder`] assembles the standard pipeline:
//!
//! - [`MetricsApiClient`]: timing and outcome per API category
//! - [`TraceApiClient`]: trace id header and one log line per call
//! - [`ReAuthenticationApiClient`]: one retry after refreshing the session
//! - [`ConnectivityApiClient`]: bounded retry on connection failures
//! - [`AuthenticationProxyApiClient`]: the actual HTTP round trip

pub mod builder;
pub mod client;
pub mod connectivity;
pub mod metrics;
pub mod reauth;
pub mod trace;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::ApiClientBuilder;
pub use client::AuthenticationProxyApiClient;
pub use connectivity::ConnectivityApiClient;
pub use metrics::MetricsApiClient;
pub use reauth::ReAuthenticationApiClient;
pub use trace::TraceApiClient;
