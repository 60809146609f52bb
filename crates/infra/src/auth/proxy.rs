//! Session authentication proxy
//!
//! Logs users in with their TLS client identity and keeps one session token
//! per user:
//! - Credential registrations and sessions live in separate concurrent maps
//! - A reverse index resolves a session token to its owner without a scan
//! - Each registration builds its transport once, on first use
//! - Re-authentication is driven by the client pipeline through
//!   [`AuthenticationProxy::re_auth_session`]

use std::sync::Arc;

use async_trait::async_trait;
use bridgekit_core::{
    AuthenticationProxy, HttpTransport, TransportError, TransportFactory, TransportRequest,
};
use bridgekit_domain::{
    is_authorization_status, AuthenticationConfig, AuthenticationError, AuthenticationToken,
    HttpMethod, KeyStore, UserCredential,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::http::ReqwestTransportFactory;

/// Identity label used when the identity-less transport cannot be built.
const DEFAULT_IDENTITY: &str = "default";

/// Body returned by the session and key manager login endpoints.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    name: Option<String>,
    token: String,
}

/// A credential and the transport built from it.
struct Registration {
    credential: UserCredential,
    transport: OnceCell<Arc<dyn HttpTransport>>,
}

impl Registration {
    fn new(credential: UserCredential) -> Self {
        Self { credential, transport: OnceCell::new() }
    }

    fn transport(
        &self,
        factory: &dyn TransportFactory,
    ) -> Result<Arc<dyn HttpTransport>, TransportError> {
        self.transport.get_or_try_init(|| factory.build(Some(&self.credential))).cloned()
    }
}

/// Current session of one user.
#[derive(Debug, Clone)]
struct SessionEntry {
    token: AuthenticationToken,
    /// Session token replaced by `token`, so late 401s on it still resolve.
    superseded: Option<String>,
}

/// [`AuthenticationProxy`] backed by a session login protocol over mutual TLS.
pub struct SessionAuthenticationProxy {
    config: AuthenticationConfig,
    factory: Arc<dyn TransportFactory>,
    registrations: DashMap<String, Arc<Registration>>,
    sessions: DashMap<String, SessionEntry>,
    /// Session token (current or superseded) to owning user.
    owners: DashMap<String, String>,
    default_transport: OnceCell<Arc<dyn HttpTransport>>,
}

impl SessionAuthenticationProxy {
    pub fn new(config: AuthenticationConfig, factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            config,
            factory,
            registrations: DashMap::new(),
            sessions: DashMap::new(),
            owners: DashMap::new(),
            default_transport: OnceCell::new(),
        }
    }

    /// Proxy using reqwest transports with the configured timeouts.
    pub fn from_config(config: AuthenticationConfig) -> Self {
        let factory = Arc::new(ReqwestTransportFactory::from_config(&config));
        Self::new(config, factory)
    }

    pub const fn config(&self) -> &AuthenticationConfig {
        &self.config
    }

    /// Number of users holding a session.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn registration(&self, user_id: &str) -> Result<Arc<Registration>, AuthenticationError> {
        self.registrations
            .get(user_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AuthenticationError::UnregisteredUser { user_id: user_id.to_string() })
    }

    /// Owner of `session_token`. Session tokens are assumed unique per user.
    fn user_for_session(&self, session_token: &str) -> Option<String> {
        if session_token.is_empty() {
            return None;
        }
        self.owners.get(session_token).map(|owner| owner.value().clone())
    }

    /// Drop `session_token` from the reverse index if `user_id` still owns it.
    fn release_session(&self, session_token: &str, user_id: &str) {
        self.owners.remove_if(session_token, |_, owner| owner == user_id);
    }

    async fn login(
        &self,
        transport: &dyn HttpTransport,
        user_id: &str,
        url: &str,
    ) -> Result<String, AuthenticationError> {
        let request = TransportRequest::new(HttpMethod::Post, url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");

        let response = transport.execute(request).await.map_err(|err| {
            AuthenticationError::LoginFailed { user_id: user_id.to_string(), reason: err.to_string() }
        })?;

        if is_authorization_status(response.status) {
            return Err(AuthenticationError::LoginRejected {
                user_id: user_id.to_string(),
                status: response.status,
                reason: response.text(),
            });
        }

        if !response.is_success() {
            return Err(AuthenticationError::LoginFailed {
                user_id: user_id.to_string(),
                reason: format!("{url} returned status {}", response.status),
            });
        }

        let body: LoginResponse = serde_json::from_slice(&response.body).map_err(|err| {
            AuthenticationError::LoginFailed {
                user_id: user_id.to_string(),
                reason: format!("malformed login response from {url}: {err}"),
            }
        })?;

        if body.token.trim().is_empty() {
            return Err(AuthenticationError::LoginFailed {
                user_id: user_id.to_string(),
                reason: format!("{url} returned an empty token"),
            });
        }

        debug!(user_id, name = body.name.as_deref().unwrap_or("token"), "login succeeded");
        Ok(body.token)
    }

    fn default_transport(&self) -> Result<Arc<dyn HttpTransport>, AuthenticationError> {
        self.default_transport
            .get_or_try_init(|| self.factory.build(None))
            .cloned()
            .map_err(|err| AuthenticationError::InvalidCredential {
                user_id: DEFAULT_IDENTITY.to_string(),
                reason: err.to_string(),
            })
    }
}

#[async_trait]
impl AuthenticationProxy for SessionAuthenticationProxy {
    async fn authenticate(&self, user_id: &str) -> Result<AuthenticationToken, AuthenticationError> {
        let transport = self.http_client_for_user(user_id)?;

        let session_token =
            self.login(transport.as_ref(), user_id, &self.config.session_auth_url).await?;
        let key_manager_token = match &self.config.key_manager_auth_url {
            Some(url) => Some(self.login(transport.as_ref(), user_id, url).await?),
            None => None,
        };

        let token =
            AuthenticationToken::new(session_token, key_manager_token, self.config.session_ttl());

        // The entry guard keeps the session and its index entries in step per user
        match self.sessions.entry(user_id.to_string()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                let previous = std::mem::replace(&mut entry.token, token.clone());
                let dropped = entry.superseded.replace(previous.session_token);
                self.owners.insert(token.session_token.clone(), user_id.to_string());
                if let Some(dropped) = dropped {
                    if dropped != token.session_token
                        && entry.superseded.as_deref() != Some(dropped.as_str())
                    {
                        self.release_session(&dropped, user_id);
                    }
                }
            }
            Entry::Vacant(vacant) => {
                self.owners.insert(token.session_token.clone(), user_id.to_string());
                vacant.insert(SessionEntry { token: token.clone(), superseded: None });
            }
        }

        info!(user_id, expires_at = %token.expires_at, "user authenticated");
        Ok(token)
    }

    fn is_authenticated(&self, user_id: &str) -> bool {
        self.sessions.get(user_id).is_some_and(|entry| !entry.token.is_expired())
    }

    fn invalidate(&self, user_id: &str) {
        if let Some((_, entry)) = self.sessions.remove(user_id) {
            self.release_session(&entry.token.session_token, user_id);
            if let Some(superseded) = &entry.superseded {
                self.release_session(superseded, user_id);
            }
            debug!(user_id, "session invalidated");
        }
    }

    fn get_token(&self, user_id: &str) -> Result<AuthenticationToken, AuthenticationError> {
        self.sessions
            .get(user_id)
            .map(|entry| entry.token.clone())
            .ok_or_else(|| AuthenticationError::NotAuthenticated { user_id: user_id.to_string() })
    }

    async fn re_auth_session(
        &self,
        session_token: &str,
        status: u16,
    ) -> Result<Option<AuthenticationToken>, AuthenticationError> {
        if !is_authorization_status(status) {
            debug!(status, "re-authentication not applicable");
            return Ok(None);
        }

        let Some(user_id) = self.user_for_session(session_token) else {
            warn!(status, "no user owns the rejected session, skipping re-authentication");
            return Ok(None);
        };

        info!(user_id = %user_id, status, "re-authenticating user after authorization failure");
        self.authenticate(&user_id).await.map(Some)
    }

    fn register_user(&self, user_id: &str, key_store: KeyStore, key_store_password: &str) {
        let format = key_store.format();
        let credential = UserCredential::new(user_id, key_store, key_store_password);
        self.registrations.insert(user_id.to_string(), Arc::new(Registration::new(credential)));
        info!(user_id, format, "user credential registered");
    }

    fn http_client_for_user(
        &self,
        user_id: &str,
    ) -> Result<Arc<dyn HttpTransport>, AuthenticationError> {
        let registration = self.registration(user_id)?;
        registration.transport(self.factory.as_ref()).map_err(|err| {
            warn!(user_id, error = %err, "failed to build transport from credential");
            AuthenticationError::InvalidCredential {
                user_id: user_id.to_string(),
                reason: err.message,
            }
        })
    }

    fn http_client_for_session_token(
        &self,
        session_token: &str,
    ) -> Result<Arc<dyn HttpTransport>, AuthenticationError> {
        match self.user_for_session(session_token) {
            Some(user_id) => self.http_client_for_user(&user_id),
            None => self.default_transport(),
        }
    }
}
