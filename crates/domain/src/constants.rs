//! Domain constants
//!
//! Header names, component tags and defaults shared across crates.

// Session headers carried by every authenticated API request
pub const SESSION_TOKEN_HEADER: &str = "sessionToken";
pub const KEY_MANAGER_TOKEN_HEADER: &str = "keyManagerToken";
pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

// Component tags rendered in error messages
pub const AUTHENTICATION_PROXY_COMPONENT: &str = "Authentication Proxy";
pub const OAUTH1_COMPONENT: &str = "Third-party integration/app authorization.";
pub const AUTHORIZATION_COMPONENT: &str = "Integration Authorization";

// Defaults
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECTIVITY_MAX_ATTEMPTS: u32 = 3;

/// Status code attached to payload decoding failures.
pub const PAYLOAD_DECODE_FAILURE_STATUS: u16 = 500;
