//! Authentication Proxy implementation

pub mod proxy;

pub use proxy::SessionAuthenticationProxy;
