//! Third-party app authorization

pub mod oauth1_integration;

pub use oauth1_integration::{OAuth1AuthorizedIntegration, DEFAULT_PENDING_GRANT_TTL};
