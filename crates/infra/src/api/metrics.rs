//! Metrics decorator
//!
//! Outermost layer: the recorded duration covers every retry made below it.

use std::sync::Arc;

use async_trait::async_trait;
use bridgekit_core::{ApiRequest, ApiResponse, EntitySerializer, HttpApiClient, HttpTransport};
use bridgekit_domain::RemoteApiError;

use crate::observability::ApiMetricsController;

pub struct MetricsApiClient {
    inner: Arc<dyn HttpApiClient>,
    metrics: Arc<ApiMetricsController>,
}

impl MetricsApiClient {
    pub fn new(inner: Arc<dyn HttpApiClient>, metrics: Arc<ApiMetricsController>) -> Self {
        Self { inner, metrics }
    }

    pub fn metrics(&self) -> &Arc<ApiMetricsController> {
        &self.metrics
    }
}

#[async_trait]
impl HttpApiClient for MetricsApiClient {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, RemoteApiError> {
        let context = self.metrics.start_api_call(&request.path);
        let result = self.inner.execute(request).await;
        self.metrics.finish_api_call(context, result.is_ok());
        result
    }

    fn service_name(&self) -> &str {
        self.inner.service_name()
    }

    fn escape_string(&self, value: &str) -> String {
        self.inner.escape_string(value)
    }

    fn set_entity_serializer(&self, serializer: Arc<dyn EntitySerializer>) {
        self.inner.set_entity_serializer(serializer);
    }

    fn transport(
        &self,
        session_token: Option<&str>,
    ) -> Result<Arc<dyn HttpTransport>, RemoteApiError> {
        self.inner.transport(session_token)
    }
}

#[cfg(test)]
mod tests {
    use bridgekit_domain::ApiCategory;

    use super::*;
    use crate::api::testing::ScriptedClient;

    #[tokio::test]
    async fn records_success_and_failure_per_category() {
        let metrics = Arc::new(ApiMetricsController::new());
        let ok = MetricsApiClient::new(ScriptedClient::always(ScriptedClient::ok()), metrics.clone());
        let failing =
            MetricsApiClient::new(ScriptedClient::always(ScriptedClient::status(500)), metrics.clone());

        ok.execute(ApiRequest::get("/configuration/abc")).await.unwrap();
        failing.execute(ApiRequest::get("/other/xyz")).await.unwrap_err();

        let configuration = metrics.snapshot(ApiCategory::Configuration).unwrap();
        assert_eq!((configuration.count, configuration.success, configuration.failure), (1, 1, 0));
        let other = metrics.snapshot(ApiCategory::Other).unwrap();
        assert_eq!((other.count, other.success, other.failure), (1, 0, 1));
        assert_eq!(metrics.active_calls(), 0);
    }

    #[tokio::test]
    async fn errors_pass_through_unchanged() {
        let metrics = Arc::new(ApiMetricsController::new());
        let client = MetricsApiClient::new(
            ScriptedClient::always(ScriptedClient::connection_failure()),
            metrics,
        );

        let err = client.execute(ApiRequest::get("/v1/info")).await.unwrap_err();
        assert!(err.is_connection_failure());
    }
}
