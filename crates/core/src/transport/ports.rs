//! Port interfaces for HTTP transports

use std::sync::Arc;

use async_trait::async_trait;
use bridgekit_domain::UserCredential;

use super::{TransportError, TransportRequest, TransportResponse};

/// Executes one request/response cycle.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Builds transports bound to a TLS identity.
pub trait TransportFactory: Send + Sync {
    /// Build a transport presenting `credential` as client identity, or the
    /// default identity when `None`.
    fn build(
        &self,
        credential: Option<&UserCredential>,
    ) -> Result<Arc<dyn HttpTransport>, TransportError>;
}
