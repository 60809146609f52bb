//! Trace decorator
//!
//! Tags every request with an `X-Trace-Id` header and logs one line per
//! call once the inner layers are done. Never alters results.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bridgekit_core::{ApiRequest, ApiResponse, EntitySerializer, HttpApiClient, HttpTransport};
use bridgekit_domain::constants::TRACE_ID_HEADER;
use bridgekit_domain::RemoteApiError;
use tracing::{info, warn};
use uuid::Uuid;

pub struct TraceApiClient {
    inner: Arc<dyn HttpApiClient>,
}

impl TraceApiClient {
    pub fn new(inner: Arc<dyn HttpApiClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HttpApiClient for TraceApiClient {
    async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, RemoteApiError> {
        let trace_id = match request.header(TRACE_ID_HEADER) {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                request.headers.insert(TRACE_ID_HEADER.to_string(), id.clone());
                id
            }
        };
        let method = request.method;
        let path = request.path.clone();
        let started = Instant::now();

        let result = self.inner.execute(request).await;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let service = self.inner.service_name();
        match &result {
            Ok(response) => info!(
                service,
                trace_id = %trace_id,
                %method,
                path = %path,
                status = response.status,
                elapsed_ms,
                "API call succeeded"
            ),
            Err(err) => warn!(
                service,
                trace_id = %trace_id,
                %method,
                path = %path,
                status = %err.status(),
                elapsed_ms,
                error = %err.message(),
                "API call failed"
            ),
        }

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
