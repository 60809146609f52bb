//! Shared helpers for infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bridgekit_core::AuthenticationProxy;
use bridgekit_domain::{AuthenticationConfig, KeyStore};
use bridgekit_infra::{ReqwestTransportFactory, SessionAuthenticationProxy};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const IDENTITY_PEM: &[u8] = include_bytes!("fixtures/identity.pem");
pub const OAUTH1_PRIVATE_KEY: &str = include_str!("fixtures/oauth1_private_key.pem");

pub const SESSION_LOGIN_PATH: &str = "/sessionauth/v1/authenticate";
pub const KEY_MANAGER_LOGIN_PATH: &str = "/keyauth/v1/authenticate";

/// Proxy logging in against `server`, with `user_id` already registered.
pub fn proxy_for(server: &MockServer, user_id: &str) -> Arc<SessionAuthenticationProxy> {
    proxy_with_config(AuthenticationConfig::new(format!("{}{SESSION_LOGIN_PATH}", server.uri())), user_id)
}

pub fn proxy_with_config(
    config: AuthenticationConfig,
    user_id: &str,
) -> Arc<SessionAuthenticationProxy> {
    let factory = Arc::new(ReqwestTransportFactory::new(Duration::from_secs(2), Duration::from_secs(5)));
    let proxy = SessionAuthenticationProxy::new(config, factory);
    proxy.register_user(user_id, KeyStore::Pem(IDENTITY_PEM.to_vec()), "");
    Arc::new(proxy)
}

pub fn token_body(name: &str, token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "name": name, "token": token }))
}

/// Login endpoint answering `token` for at most `times` calls.
pub async fn mount_session_login(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(SESSION_LOGIN_PATH))
        .respond_with(token_body("sessionToken", token))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

/// Number of requests `server` received on `request_path`.
pub async fn hits(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}
