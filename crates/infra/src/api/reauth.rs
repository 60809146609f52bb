//! Re-authentication decorator
//!
//! On a 401/403 the decorator asks the Authentication Proxy to refresh the
//! session carried by the request and, if a new token comes back, retries
//! the call exactly once with the new session headers. Any other outcome
//! propagates the original error.

use std::sync::Arc;

use async_trait::async_trait;
use bridgekit_core::{
    ApiRequest, ApiResponse, AuthenticationProxy, EntitySerializer, HttpApiClient, HttpTransport,
};
use bridgekit_domain::RemoteApiError;
use tracing::{info, warn};

pub struct ReAuthenticationApiClient {
    inner: Arc<dyn HttpApiClient>,
    proxy: Arc<dyn AuthenticationProxy>,
}

impl ReAuthenticationApiClient {
    pub fn new(inner: Arc<dyn HttpApiClient>, proxy: Arc<dyn AuthenticationProxy>) -> Self {
        Self { inner, proxy }
    }
}

#[async_trait]
impl HttpApiClient for ReAuthenticationApiClient {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, RemoteApiError> {
        let err = match self.inner.execute(request.clone()).await {
            Err(err) if err.is_authorization_failure() => err,
            result => return result,
        };

        let (Some(session_token), Some(status)) = (request.session_token(), err.status_code())
        else {
            return Err(err);
        };

        let outcome = self.proxy.re_auth_session(session_token, status).await;
        match outcome {
            Ok(Some(token)) => {
                info!(
                    service = %self.inner.service_name(),
                    path = %request.path,
                    status,
                    "session refreshed, retrying call once"
                );
                let mut retry = request;
                retry.apply_session(&token);
                self.inner.execute(retry).await
            }
            Ok(None) => Err(err),
            Err(auth_err) => {
                warn!(
                    service = %self.inner.service_name(),
                    path = %request.path,
                    error = %auth_err,
                    "re-authentication failed"
                );
                Err(err)
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
