//! Decorated API client contract
//!
//! Every layer of the client pipeline implements [`HttpApiClient`]. Callers
//! use the typed helpers from [`HttpApiClientExt`], which are available on
//! any client, including `dyn HttpApiClient`.

pub mod ports;

use std::collections::BTreeMap;

use bridgekit_domain::constants::{KEY_MANAGER_TOKEN_HEADER, SESSION_TOKEN_HEADER};
use bridgekit_domain::{AuthenticationToken, HttpMethod};
use serde_json::Value;

pub use ports::{HttpApiClient, HttpApiClientExt};

/// Request headers, keyed by header name.
pub type Headers = BTreeMap<String, String>;

/// Query parameters in send order.
pub type QueryParams = Vec<(String, String)>;

/// One logical call, relative to the client's base path.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Headers,
    pub query: QueryParams,
    pub payload: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            query: QueryParams::new(),
            payload: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, payload: Value) -> Self {
        Self::new(HttpMethod::Post, path).with_payload(payload)
    }

    pub fn put(path: impl Into<String>, payload: Value) -> Self {
        Self::new(HttpMethod::Put, path).with_payload(payload)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query.extend(query);
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attach the session headers of `token`, replacing previous ones.
    #[must_use]
    pub fn with_session(mut self, token: &AuthenticationToken) -> Self {
        self.apply_session(token);
        self
    }

    pub fn apply_session(&mut self, token: &AuthenticationToken) {
        self.headers.insert(SESSION_TOKEN_HEADER.to_string(), token.session_token.clone());
        match &token.key_manager_token {
            Some(km) => {
                self.headers.insert(KEY_MANAGER_TOKEN_HEADER.to_string(), km.clone());
            }
            None => {
                self.headers.remove(KEY_MANAGER_TOKEN_HEADER);
            }
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Session token carried by this request, if any.
    pub fn session_token(&self) -> Option<&str> {
        self.header(SESSION_TOKEN_HEADER)
    }
}

/// Successful response with a decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, headers: Vec::new(), body }
    }
}
