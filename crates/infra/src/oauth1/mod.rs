//! OAuth1 (RSA-SHA1) client side
//!
//! [`OAuth1Provider`] drives the three-legged handshake and signs calls
//! made with an access token. Signers are shared through
//! [`OAuthRsaSignerFactory`].

pub mod params;
pub mod provider;
pub mod signer;

pub use params::{percent_encode, OAuthParameters};
pub use provider::OAuth1Provider;
pub use signer::{OAuthRsaSignerFactory, RsaSigner};
