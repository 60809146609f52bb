//! Port interfaces for per-user authentication
//!
//! The Authentication Proxy owns two independent maps: credential
//! registrations and live session tokens. Dropping a token never drops the
//! registration, and re-registering never drops the token.

use std::sync::Arc;

use async_trait::async_trait;
use bridgekit_domain::{AuthenticationError, AuthenticationToken, KeyStore};

use crate::transport::HttpTransport;

/// Credential lifecycle and session management for many users.
#[async_trait]
pub trait AuthenticationProxy: Send + Sync {
    /// Log the user in and store the resulting token.
    async fn authenticate(&self, user_id: &str) -> Result<AuthenticationToken, AuthenticationError>;

    /// True iff a non-expired token is stored for the user.
    fn is_authenticated(&self, user_id: &str) -> bool;

    /// Remove the stored token. Idempotent.
    fn invalidate(&self, user_id: &str);

    fn get_token(&self, user_id: &str) -> Result<AuthenticationToken, AuthenticationError>;

    fn get_session_token(&self, user_id: &str) -> Result<String, AuthenticationError> {
        self.get_token(user_id).map(|token| token.session_token)
    }

    /// Re-authenticate the owner of `session_token` after an authorization
    /// failure.
    ///
    /// Returns `Ok(None)` when not applicable: `status` is not 401/403, or no
    /// user owns the session. At most one login attempt is made per call.
    async fn re_auth_session(
        &self,
        session_token: &str,
        status: u16,
    ) -> Result<Option<AuthenticationToken>, AuthenticationError>;

    /// Bind a keystore to the user, replacing any prior registration.
    fn register_user(&self, user_id: &str, key_store: KeyStore, key_store_password: &str);

    /// Transport presenting the user's TLS identity.
    fn http_client_for_user(
        &self,
        user_id: &str,
    ) -> Result<Arc<dyn HttpTransport>, AuthenticationError>;

    /// Transport of the user owning `session_token`, or the default one.
    fn http_client_for_session_token(
        &self,
        session_token: &str,
    ) -> Result<Arc<dyn HttpTransport>, AuthenticationError>;
}
