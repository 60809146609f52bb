//! Port interfaces for third-party app authorization

use std::collections::HashMap;

use async_trait::async_trait;
use bridgekit_domain::{AuthorizationError, HttpMethod};

use crate::transport::TransportResponse;

/// Callback data sent back by the third party once the user approved access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationPayload {
    pub parameters: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl AuthorizationPayload {
    pub fn from_parameters<I, K, V>(parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            parameters: parameters.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            ..Self::default()
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }
}

/// An integration that needs the user's consent before calling a third party.
///
/// `url` identifies the third-party instance (for example a Jira base URL);
/// grants are kept per `(url, user_id)`.
#[async_trait]
pub trait AuthorizedIntegration: Send + Sync {
    fn is_user_authorized(&self, url: &str, user_id: i64) -> bool;

    /// URL the user must visit to grant access.
    async fn get_authorization_url(&self, url: &str, user_id: i64)
        -> Result<String, AuthorizationError>;

    /// Complete the grant from the third party's callback.
    async fn authorize(&self, payload: AuthorizationPayload) -> Result<(), AuthorizationError>;

    /// Call `request_url` on behalf of an authorized user.
    async fn authorized_request(
        &self,
        url: &str,
        user_id: i64,
        method: HttpMethod,
        request_url: &str,
        body: Option<String>,
    ) -> Result<TransportResponse, AuthorizationError>;
}
