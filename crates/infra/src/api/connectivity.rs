//! Connectivity decorator
//!
//! Retries calls that never obtained a response. HTTP status errors pass
//! through untouched. There is no backoff beyond the transport's own
//! connect timeout.

use std::sync::Arc;

use async_trait::async_trait;
use bridgekit_core::{ApiRequest, ApiResponse, EntitySerializer, HttpApiClient, HttpTransport};
use bridgekit_domain::constants::DEFAULT_CONNECTIVITY_MAX_ATTEMPTS;
use bridgekit_domain::RemoteApiError;
use tracing::warn;

pub struct ConnectivityApiClient {
    inner: Arc<dyn HttpApiClient>,
    max_attempts: u32,
}

impl ConnectivityApiClient {
    /// `max_attempts` counts the first try; values below 1 are raised to 1.
    pub fn new(inner: Arc<dyn HttpApiClient>, max_attempts: u32) -> Self {
        Self { inner, max_attempts: max_attempts.max(1) }
    }

    pub fn with_default_attempts(inner: Arc<dyn HttpApiClient>) -> Self {
        Self::new(inner, DEFAULT_CONNECTIVITY_MAX_ATTEMPTS)
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[async_trait]
impl HttpApiClient for ConnectivityApiClient {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, RemoteApiError> {
        let mut attempt = 1;
        loop {
            match self.inner.execute(request.clone()).await {
                Err(err) if err.is_connection_failure() && attempt < self.max_attempts => {
                    warn!(
                        service = %self.inner.service_name(),
                        path = %request.path,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err.message(),
                        "connection failure, retrying"
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
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
    use super::*;
    use crate::api::testing::ScriptedClient;

    #[tokio::test]
    async fn remote_service_errors_are_not_retried() {
        let inner = ScriptedClient::always(ScriptedClient::status(500));
        let client = ConnectivityApiClient::new(inner.clone(), 5);

        let err = client.execute(ApiRequest::get("/v1/info")).await.unwrap_err();

        assert_eq!(err.status_code(), Some(500));
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn authorization_errors_are_not_retried() {
        let inner = ScriptedClient::always(ScriptedClient::status(401));
        let client = ConnectivityApiClient::new(inner.clone(), 5);

        client.execute(ApiRequest::get("/v1/info")).await.unwrap_err();
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn connection_failures_retry_until_success() {
        let inner = ScriptedClient::sequence(
            vec![ScriptedClient::connection_failure(), ScriptedClient::connection_failure()],
            ScriptedClient::ok(),
        );
        let client = ConnectivityApiClient::new(inner.clone(), 3);

        assert!(client.execute(ApiRequest::get("/v1/info")).await.is_ok());
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn exhausted_attempts_surface_last_error() {
        let inner = ScriptedClient::always(ScriptedClient::connection_failure());
        let client = ConnectivityApiClient::new(inner.clone(), 3);

        let err = client.execute(ApiRequest::get("/v1/info")).await.unwrap_err();

        assert!(err.is_connection_failure());
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn zero_attempts_still_calls_once() {
        let inner = ScriptedClient::always(ScriptedClient::connection_failure());
        let client = ConnectivityApiClient::new(inner.clone(), 0);

        client.execute(ApiRequest::get("/v1/info")).await.unwrap_err();
        assert_eq!(inner.calls(), 1);
    }
}
