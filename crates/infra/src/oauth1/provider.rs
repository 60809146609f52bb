//! OAuth1 (RSA-SHA1) three-legged handshake against one third party

use std::sync::Arc;

use bridgekit_core::{HttpTransport, TransportRequest, TransportResponse};
use bridgekit_domain::{HttpMethod, OAuth1Error, OAuth1Settings};
use tracing::{debug, warn};
use url::Url;

use super::params::OAuthParameters;
use super::signer::{OAuthRsaSignerFactory, RsaSigner};
use crate::http::ReqwestTransport;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Validated settings of a configured provider.
#[derive(Debug)]
struct ProviderSettings {
    consumer_key: String,
    signer: Arc<RsaSigner>,
    request_temporary_token_url: String,
    authorization_callback_url: String,
    authorize_temporary_token_url: String,
    request_access_token_url: String,
}

#[derive(Debug)]
enum ProviderState {
    Unconfigured,
    Configured(ProviderSettings),
}

/// OAuth1 provider.
///
/// Built from [`OAuth1Settings`]; settings that fail validation leave the
/// provider unconfigured and every operation then fails with
/// [`OAuth1Error::NotConfigured`].
pub struct OAuth1Provider {
    state: ProviderState,
    transport: Arc<dyn HttpTransport>,
}

impl OAuth1Provider {
    pub fn new(
        settings: &OAuth1Settings,
        transport: Arc<dyn HttpTransport>,
        signers: &OAuthRsaSignerFactory,
    ) -> Self {
        let state = match validate(settings, signers) {
            Ok(settings) => ProviderState::Configured(settings),
            Err(err) => {
                warn!(
                    consumer_key = %settings.consumer_key,
                    error = %err,
                    "OAuth1 provider settings rejected, provider left unconfigured"
                );
                ProviderState::Unconfigured
            }
        };
        Self { state, transport }
    }

    /// Provider backed by a default reqwest transport.
    pub fn with_default_transport(
        settings: &OAuth1Settings,
        signers: &OAuthRsaSignerFactory,
    ) -> Result<Self, OAuth1Error> {
        let transport = ReqwestTransport::new()
            .map_err(|e| OAuth1Error::failure(format!("Failed to build HTTP transport: {e}")))?;
        Ok(Self::new(settings, Arc::new(transport), signers))
    }

    pub fn unconfigured(transport: Arc<dyn HttpTransport>) -> Self {
        Self { state: ProviderState::Unconfigured, transport }
    }

    pub const fn is_configured(&self) -> bool {
        matches!(self.state, ProviderState::Configured(_))
    }

    fn settings(&self) -> Result<&ProviderSettings, OAuth1Error> {
        match &self.state {
            ProviderState::Configured(settings) => Ok(settings),
            ProviderState::Unconfigured => Err(OAuth1Error::NotConfigured),
        }
    }

    /// First leg: obtain a temporary (request) token.
    pub async fn request_temporary_token(&self) -> Result<String, OAuth1Error> {
        let settings = self.settings()?;
        let params = OAuthParameters::new(&settings.consumer_key)
            .with("oauth_callback", &settings.authorization_callback_url);

        let response = self
            .token_request(settings, &settings.request_temporary_token_url, &params)
            .await?;
        token_from_response(&response)
    }

    /// Second leg: the URL the user visits to approve `temporary_token`.
    pub fn request_authorization_url(&self, temporary_token: &str) -> Result<String, OAuth1Error> {
        let settings = self.settings()?;
        let base = &settings.authorize_temporary_token_url;
        let separator = if base.contains('?') { '&' } else { '?' };
        Ok(format!("{base}{separator}oauth_token={}", urlencoding::encode(temporary_token)))
    }

    /// Third leg: exchange an approved temporary token for an access token.
    pub async fn request_access_token(
        &self,
        temporary_token: &str,
        verifier: &str,
    ) -> Result<String, OAuth1Error> {
        let settings = self.settings()?;
        let params = OAuthParameters::new(&settings.consumer_key)
            .with("oauth_token", temporary_token)
            .with("oauth_verifier", verifier);

        let response =
            self.token_request(settings, &settings.request_access_token_url, &params).await?;
        token_from_response(&response)
    }

    /// Signed call to the third party on behalf of `access_token`.
    ///
    /// Non-2xx answers become [`OAuth1Error::HttpRequest`] carrying the
    /// status code.
    pub async fn make_authorized_request(
        &self,
        access_token: &str,
        url: &str,
        method: HttpMethod,
        body: Option<String>,
    ) -> Result<TransportResponse, OAuth1Error> {
        let settings = self.settings()?;
        let params =
            OAuthParameters::new(&settings.consumer_key).with("oauth_token", access_token);

        let mut request = signed_request(settings, method, url, &params)?;
        if let Some(body) = body {
            request = request.header("Content-Type", JSON_CONTENT_TYPE).body(body);
        }

        let response = self.send(request).await?;
        if !response.is_success() {
            let text = response.text();
            let message = if text.trim().is_empty() {
                format!("{url} returned status {}", response.status)
            } else {
                text.trim().to_string()
            };
            return Err(OAuth1Error::http_request(response.status, message));
        }
        Ok(response)
    }

    async fn token_request(
        &self,
        settings: &ProviderSettings,
        url: &str,
        params: &OAuthParameters,
    ) -> Result<TransportResponse, OAuth1Error> {
        let request = signed_request(settings, HttpMethod::Post, url, params)?
            .header("Content-Type", FORM_CONTENT_TYPE);

        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(OAuth1Error::failure(format!(
                "Token request to {url} returned status {}: {}",
                response.status,
                response.text()
            )));
        }
        Ok(response)
    }

    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, OAuth1Error> {
        debug!(method = %request.method, url = %request.url, "sending OAuth1 signed request");
        self.transport
            .execute(request)
            .await
            .map_err(|e| OAuth1Error::failure(e.to_string()))
    }
}

impl std::fmt::Debug for OAuth1Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Provider").field("configured", &self.is_configured()).finish()
    }
}

fn validate(
    settings: &OAuth1Settings,
    signers: &OAuthRsaSignerFactory,
) -> Result<ProviderSettings, OAuth1Error> {
    if settings.consumer_key.trim().is_empty() {
        return Err(OAuth1Error::failure("Consumer key is empty"));
    }
    for (name, value) in [
        ("request temporary token URL", &settings.request_temporary_token_url),
        ("authorization callback URL", &settings.authorization_callback_url),
        ("authorize temporary token URL", &settings.authorize_temporary_token_url),
        ("request access token URL", &settings.request_access_token_url),
    ] {
        Url::parse(value).map_err(|e| OAuth1Error::failure(format!("Invalid {name} {value}: {e}")))?;
    }

    Ok(ProviderSettings {
        consumer_key: settings.consumer_key.clone(),
        signer: signers.signer(&settings.private_key)?,
        request_temporary_token_url: settings.request_temporary_token_url.clone(),
        authorization_callback_url: settings.authorization_callback_url.clone(),
        authorize_temporary_token_url: settings.authorize_temporary_token_url.clone(),
        request_access_token_url: settings.request_access_token_url.clone(),
    })
}

fn signed_request(
    settings: &ProviderSettings,
    method: HttpMethod,
    url: &str,
    params: &OAuthParameters,
) -> Result<TransportRequest, OAuth1Error> {
    let base_string = params.base_string(method, url)?;
    let signature = settings.signer.sign(&base_string)?;
    Ok(TransportRequest::new(method, url).header("Authorization", params.authorization_header(&signature)))
}

fn token_from_response(response: &TransportResponse) -> Result<String, OAuth1Error> {
    url::form_urlencoded::parse(&response.body)
        .find(|(key, _)| key == "oauth_token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| OAuth1Error::failure("Token response has no oauth_token"))
}
