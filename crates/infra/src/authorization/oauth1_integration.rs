//! OAuth1-backed [`AuthorizedIntegration`]
//!
//! One provider per third-party instance URL. Pending handshakes are keyed
//! by temporary token, grants by `(instance url, user id)`. A pending
//! handshake is consumed by its first callback and expires after
//! [`DEFAULT_PENDING_GRANT_TTL`] when the user never comes back.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bridgekit_core::{AuthorizationPayload, AuthorizedIntegration, TransportResponse};
use bridgekit_domain::{AuthorizationError, HttpMethod, OAuth1Error};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::oauth1::OAuth1Provider;

const OAUTH_TOKEN_PARAM: &str = "oauth_token";
const OAUTH_VERIFIER_PARAM: &str = "oauth_verifier";

/// How long a user has to complete the third-party consent screen.
pub const DEFAULT_PENDING_GRANT_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
struct PendingGrant {
    url: String,
    user_id: i64,
    issued_at: Instant,
}

impl PendingGrant {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.issued_at.elapsed() >= ttl
    }
}

pub struct OAuth1AuthorizedIntegration {
    name: String,
    pending_ttl: Duration,
    providers: DashMap<String, Arc<OAuth1Provider>>,
    pending: DashMap<String, PendingGrant>,
    access_tokens: DashMap<(String, i64), String>,
}

impl OAuth1AuthorizedIntegration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pending_ttl: DEFAULT_PENDING_GRANT_TTL,
            providers: DashMap::new(),
            pending: DashMap::new(),
            access_tokens: DashMap::new(),
        }
    }

    #[must_use]
    pub fn with_pending_ttl(mut self, ttl: Duration) -> Self {
        self.pending_ttl = ttl;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register the provider used for the instance at `url`.
    pub fn register_provider(&self, url: impl Into<String>, provider: Arc<OAuth1Provider>) {
        self.providers.insert(url.into(), provider);
    }

    /// Drop the grant of `user_id` on `url`. Returns whether one existed.
    pub fn revoke(&self, url: &str, user_id: i64) -> bool {
        self.access_tokens.remove(&(url.to_string(), user_id)).is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop handshakes older than the pending TTL. Returns how many went.
    pub fn evict_expired(&self) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, grant| !grant.is_expired(self.pending_ttl));
        let evicted = before.saturating_sub(self.pending.len());
        if evicted > 0 {
            debug!(integration = %self.name, evicted, "expired OAuth1 handshakes evicted");
        }
        evicted
    }

    fn provider(&self, url: &str) -> Result<Arc<OAuth1Provider>, AuthorizationError> {
        self.providers
            .get(url)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(AuthorizationError::OAuth1(OAuth1Error::NotConfigured))
    }
}

#[async_trait]
impl AuthorizedIntegration for OAuth1AuthorizedIntegration {
    fn is_user_authorized(&self, url: &str, user_id: i64) -> bool {
        self.access_tokens.contains_key(&(url.to_string(), user_id))
    }

    async fn get_authorization_url(
        &self,
        url: &str,
        user_id: i64,
    ) -> Result<String, AuthorizationError> {
        let provider = self.provider(url)?;
        let temporary_token = provider.request_temporary_token().await?;
        let authorization_url = provider.request_authorization_url(&temporary_token)?;

        self.evict_expired();
        self.pending.insert(
            temporary_token,
            PendingGrant { url: url.to_string(), user_id, issued_at: Instant::now() },
        );
        info!(integration = %self.name, %url, user_id, "OAuth1 authorization started");
        Ok(authorization_url)
    }

    async fn authorize(&self, payload: AuthorizationPayload) -> Result<(), AuthorizationError> {
        let token = payload.parameter(OAUTH_TOKEN_PARAM).ok_or_else(|| {
            AuthorizationError::MissingParameter { parameter: OAUTH_TOKEN_PARAM.to_string() }
        })?;
        let verifier = payload.parameter(OAUTH_VERIFIER_PARAM).ok_or_else(|| {
            AuthorizationError::MissingParameter { parameter: OAUTH_VERIFIER_PARAM.to_string() }
        })?;

        // Taking the grant makes every temporary token single use
        let grant = self
            .pending
            .remove(token)
            .map(|(_, grant)| grant)
            .filter(|grant| !grant.is_expired(self.pending_ttl))
            .ok_or_else(|| AuthorizationError::UnknownTemporaryToken { token: token.to_string() })?;

        let provider = self.provider(&grant.url)?;
        let access_token = provider.request_access_token(token, verifier).await.map_err(|err| {
            warn!(integration = %self.name, url = %grant.url, user_id = grant.user_id, error = %err, "OAuth1 access token exchange failed");
            err
        })?;

        info!(integration = %self.name, url = %grant.url, user_id = grant.user_id, "OAuth1 authorization granted");
        self.access_tokens.insert((grant.url, grant.user_id), access_token);
        Ok(())
    }

    async fn authorized_request(
        &self,
        url: &str,
        user_id: i64,
        method: HttpMethod,
        request_url: &str,
        body: Option<String>,
    ) -> Result<TransportResponse, AuthorizationError> {
        let access_token = self
            .access_tokens
            .get(&(url.to_string(), user_id))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AuthorizationError::UserNotAuthorized { user_id, url: url.to_string() })?;
        let provider = self.provider(url)?;

        Ok(provider.make_authorized_request(&access_token, request_url, method, body).await?)
    }
}

impl std::fmt::Debug for OAuth1AuthorizedIntegration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1AuthorizedIntegration")
            .field("name", &self.name)
            .field("instances", &self.providers.len())
            .field("grants", &self.access_tokens.len())
            .finish_non_exhaustive()
    }
}
