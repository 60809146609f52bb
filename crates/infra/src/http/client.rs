use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridgekit_core::{
    HttpTransport, TransportError, TransportFactory, TransportRequest, TransportResponse,
};
use bridgekit_domain::{
    AuthenticationConfig, HttpMethod, KeyStore, TrustStoreConfig, TrustStoreFormat, UserCredential,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Certificate, Client as ReqwestClient, Identity, Method};
use tracing::debug;

use crate::errors::InfraError;

/// reqwest-backed [`HttpTransport`].
///
/// Performs exactly one request per call. Retries belong to the client
/// pipeline, not to the transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let method = to_reqwest_method(request.method);
        let headers = header_map(&request.headers).map_err(TransportError::from)?;

        let mut builder = self.client.request(method.clone(), &request.url).headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        debug!(%method, url = %request.url, "sending HTTP request");

        let response = builder.send().await.map_err(|err| {
            debug!(%method, url = %request.url, error = %err, "HTTP request failed");
            TransportError::from(InfraError::from(err))
        })?;

        let status = response.status().as_u16();
        debug!(%method, url = %request.url, status, "received HTTP response");

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::from(InfraError::from(err)))?
            .to_vec();

        Ok(TransportResponse { status, headers, body })
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    connect_timeout: Duration,
    timeout: Duration,
    user_agent: Option<String>,
    identity: Option<UserCredential>,
    root_certificates: Vec<Certificate>,
    accept_invalid_certs: bool,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            user_agent: None,
            identity: None,
            root_certificates: Vec::new(),
            accept_invalid_certs: false,
        }
    }
}

impl ReqwestTransportBuilder {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Overall request timeout, connection included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Present the credential's keystore as TLS client identity.
    pub fn identity(mut self, credential: UserCredential) -> Self {
        self.identity = Some(credential);
        self
    }

    /// Trust `certificates` in addition to the built-in roots.
    pub fn root_certificates(mut self, certificates: Vec<Certificate>) -> Self {
        self.root_certificates.extend(certificates);
        self
    }

    /// Test-only helper to allow insecure TLS (e.g., self-signed certs).
    #[cfg(test)]
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    pub fn build(self) -> Result<ReqwestTransport, TransportError> {
        let mut builder = ReqwestClient::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(credential) = &self.identity {
            builder = match &credential.key_store {
                // PKCS#12 archives are only understood by the native-tls backend
                KeyStore::Pkcs12(der) => builder
                    .use_native_tls()
                    .identity(Identity::from_pkcs12_der(der, &credential.key_store_password).map_err(
                        |err| TransportError::build(format!("invalid PKCS#12 keystore: {err}")),
                    )?),
                KeyStore::Pem(pem) => builder.use_rustls_tls().identity(
                    Identity::from_pem(pem).map_err(|err| {
                        TransportError::build(format!("invalid PEM keystore: {err}"))
                    })?,
                ),
            };
        }

        for certificate in self.root_certificates {
            builder = builder.add_root_certificate(certificate);
        }

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|err| TransportError::from(InfraError::from(err)))?;

        Ok(ReqwestTransport { client })
    }
}

/// Read the root certificates of a trust store file.
///
/// # Errors
/// `TransportErrorKind::Build` when the file is unreadable or holds no
/// usable certificate.
pub fn load_trust_store(trust_store: &TrustStoreConfig) -> Result<Vec<Certificate>, TransportError> {
    let bytes = std::fs::read(&trust_store.file).map_err(|err| {
        TransportError::build(format!("cannot read trust store {}: {err}", trust_store.file))
    })?;

    let certificates = match trust_store.format {
        TrustStoreFormat::Pem => Certificate::from_pem_bundle(&bytes),
        TrustStoreFormat::Der => Certificate::from_der(&bytes).map(|certificate| vec![certificate]),
    }
    .map_err(|err| TransportError::build(format!("invalid trust store {}: {err}", trust_store.file)))?;

    if certificates.is_empty() {
        return Err(TransportError::build(format!(
            "trust store {} holds no certificate",
            trust_store.file
        )));
    }
    Ok(certificates)
}

/// [`TransportFactory`] producing [`ReqwestTransport`]s with shared timeouts
/// and trust roots.
#[derive(Debug, Clone)]
pub struct ReqwestTransportFactory {
    connect_timeout: Duration,
    timeout: Duration,
    trust_store: Option<TrustStoreConfig>,
}

impl ReqwestTransportFactory {
    pub const fn new(connect_timeout: Duration, timeout: Duration) -> Self {
        Self { connect_timeout, timeout, trust_store: None }
    }

    pub fn from_config(config: &AuthenticationConfig) -> Self {
        let factory = Self::new(config.connect_timeout(), config.request_timeout());
        match &config.trust_store {
            Some(trust_store) => factory.with_trust_store(trust_store.clone()),
            None => factory,
        }
    }

    /// Trust the certificates of `trust_store` on every built transport.
    #[must_use]
    pub fn with_trust_store(mut self, trust_store: TrustStoreConfig) -> Self {
        self.trust_store = Some(trust_store);
        self
    }
}

impl TransportFactory for ReqwestTransportFactory {
    fn build(
        &self,
        credential: Option<&UserCredential>,
    ) -> Result<Arc<dyn HttpTransport>, TransportError> {
        let mut builder =
            ReqwestTransport::builder().connect_timeout(self.connect_timeout).timeout(self.timeout);
        if let Some(credential) = credential {
            debug!(
                user_id = %credential.user_id,
                format = credential.key_store.format(),
                "building transport with client identity"
            );
            builder = builder.identity(credential.clone());
        }
        if let Some(trust_store) = &self.trust_store {
            builder = builder.root_certificates(load_trust_store(trust_store)?);
        }
        Ok(Arc::new(builder.build()?))
    }
}

pub(crate) const fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, InfraError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        map.append(HeaderName::try_from(name.as_str())?, HeaderValue::try_from(value.as_str())?);
    }
    Ok(map)
}
