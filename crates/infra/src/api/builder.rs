//! Assembly of the decorated client pipeline
//!
//! Layers, outermost first: Metrics → Trace → ReAuthentication →
//! Connectivity → base caller.

use std::sync::Arc;

use bridgekit_core::{AuthenticationProxy, EntitySerializer, HttpApiClient};
use bridgekit_domain::constants::DEFAULT_CONNECTIVITY_MAX_ATTEMPTS;
use bridgekit_domain::{ApiClientSettings, ConfigError};

use super::{
    AuthenticationProxyApiClient, ConnectivityApiClient, MetricsApiClient,
    ReAuthenticationApiClient, TraceApiClient,
};
use crate::observability::ApiMetricsController;

/// Builder for a fully decorated API client
pub struct ApiClientBuilder {
    service_name: String,
    base_path: String,
    proxy: Option<Arc<dyn AuthenticationProxy>>,
    metrics: Option<Arc<ApiMetricsController>>,
    serializer: Option<Arc<dyn EntitySerializer>>,
    connectivity_max_attempts: u32,
}

impl ApiClientBuilder {
    /// Start a builder for the service tagged `service_name`, reachable at
    /// `base_path`.
    pub fn new(service_name: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            base_path: base_path.into(),
            proxy: None,
            metrics: None,
            serializer: None,
            connectivity_max_attempts: DEFAULT_CONNECTIVITY_MAX_ATTEMPTS,
        }
    }

    /// Set the Authentication Proxy (required)
    pub fn authentication_proxy(mut self, proxy: Arc<dyn AuthenticationProxy>) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Share a metrics recorder between clients. A private one is created
    /// otherwise.
    pub fn metrics(mut self, metrics: Arc<ApiMetricsController>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn entity_serializer(mut self, serializer: Arc<dyn EntitySerializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    pub fn connectivity_max_attempts(mut self, attempts: u32) -> Self {
        self.connectivity_max_attempts = attempts;
        self
    }

    pub fn settings(self, settings: &ApiClientSettings) -> Self {
        self.connectivity_max_attempts(settings.connectivity_max_attempts)
    }

    /// Build the pipeline
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no Authentication Proxy was set
    pub fn build(self) -> Result<Arc<dyn HttpApiClient>, ConfigError> {
        let proxy = self
            .proxy
            .ok_or_else(|| ConfigError::Missing("authentication proxy".to_string()))?;
        let metrics = self.metrics.unwrap_or_default();

        let base = AuthenticationProxyApiClient::new(self.service_name, self.base_path, proxy.clone());
        if let Some(serializer) = self.serializer {
            base.set_entity_serializer(serializer);
        }

        let connectivity = ConnectivityApiClient::new(Arc::new(base), self.connectivity_max_attempts);
        let reauth = ReAuthenticationApiClient::new(Arc::new(connectivity), proxy);
        let trace = TraceApiClient::new(Arc::new(reauth));
        let client = MetricsApiClient::new(Arc::new(trace), metrics);

        Ok(Arc::new(client))
    }
}
