//! Base remote caller
//!
//! Innermost layer of the client pipeline. Performs one request/response
//! cycle against a fixed base path using the transport the Authentication
//! Proxy hands out for the request's session, and turns every failure into
//! a [`RemoteApiError`].

use std::sync::Arc;

use async_trait::async_trait;
use bridgekit_core::{
    ApiRequest, ApiResponse, AuthenticationProxy, EntitySerializer, HttpApiClient, HttpTransport,
    JsonEntitySerializer, QueryParams, TransportRequest, TransportResponse,
};
use bridgekit_domain::constants::PAYLOAD_DECODE_FAILURE_STATUS;
use bridgekit_domain::RemoteApiError;
use parking_lot::RwLock;
use tracing::debug;
use url::Url;

/// Status attached to failures raised before a request is sent.
const CLIENT_SETUP_FAILURE_STATUS: u16 = 500;

/// Base caller backed by an [`AuthenticationProxy`].
pub struct AuthenticationProxyApiClient {
    service_name: String,
    base_path: String,
    proxy: Arc<dyn AuthenticationProxy>,
    serializer: RwLock<Arc<dyn EntitySerializer>>,
}

impl AuthenticationProxyApiClient {
    pub fn new(
        service_name: impl Into<String>,
        base_path: impl Into<String>,
        proxy: Arc<dyn AuthenticationProxy>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            base_path: base_path.into(),
            proxy,
            serializer: RwLock::new(Arc::new(JsonEntitySerializer)),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn build_url(&self, path: &str, query: &QueryParams) -> Result<Url, RemoteApiError> {
        let joined = format!(
            "{}/{}",
            self.base_path.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let mut url = Url::parse(&joined).map_err(|e| {
            RemoteApiError::from_status(
                &self.service_name,
                CLIENT_SETUP_FAILURE_STATUS,
                format!("Invalid request URL {joined}: {e}"),
            )
        })?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        Ok(url)
    }

    fn status_error(&self, url: &Url, response: &TransportResponse) -> RemoteApiError {
        let body = response.text();
        let message = if body.trim().is_empty() {
            format!("{url} returned status {}", response.status)
        } else {
            format!("{url} returned status {}: {body}", response.status)
        };

        RemoteApiError::from_status(&self.service_name, response.status, message)
    }
}

#[async_trait]
impl HttpApiClient for AuthenticationProxyApiClient {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, RemoteApiError> {
        let transport = self.transport(request.session_token())?;
        let url = self.build_url(&request.path, &request.query)?;
        let serializer = Arc::clone(&*self.serializer.read());

        let mut transport_request = TransportRequest::new(request.method, url.as_str());
        transport_request.headers.extend(request.headers);
        transport_request.headers.push(("Accept".into(), serializer.content_type().to_string()));

        if let Some(payload) = &request.payload {
            let bytes = serializer.serialize(payload).map_err(|e| {
                RemoteApiError::from_status(
                    &self.service_name,
                    PAYLOAD_DECODE_FAILURE_STATUS,
                    e.to_string(),
                )
            })?;
            transport_request = transport_request
                .header("Content-Type", serializer.content_type())
                .body(bytes);
        }

        debug!(service = %self.service_name, method = %request.method, %url, "executing API call");

        let response = transport
            .execute(transport_request)
            .await
            .map_err(|e| RemoteApiError::connection(&self.service_name, e.to_string()))?;

        if !response.is_success() {
            return Err(self.status_error(&url, &response));
        }

        let body = serializer.deserialize(&response.body).map_err(|e| {
            RemoteApiError::from_status(
                &self.service_name,
                PAYLOAD_DECODE_FAILURE_STATUS,
                format!("Failed to decode response payload: {e}"),
            )
        })?;

        Ok(ApiResponse { status: response.status, headers: response.headers, body })
    }

    fn service_name(&self) -> &str {
        &self.service_name
    }

    fn escape_string(&self, value: &str) -> String {
        urlencoding::encode(value).into_owned()
    }

    fn set_entity_serializer(&self, serializer: Arc<dyn EntitySerializer>) {
        *self.serializer.write() = serializer;
    }

    fn transport(
        &self,
        session_token: Option<&str>,
    ) -> Result<Arc<dyn HttpTransport>, RemoteApiError> {
        // Requests without a session fall back to the proxy's default transport
        self.proxy.http_client_for_session_token(session_token.unwrap_or_default()).map_err(|e| {
            RemoteApiError::from_status(&self.service_name, CLIENT_SETUP_FAILURE_STATUS, e.to_string())
        })
    }
}
