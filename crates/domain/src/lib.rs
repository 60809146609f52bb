//! # Bridgekit Domain
//!
//! Domain types shared by every Bridgekit crate.
//!
//! This crate contains:
//! - Error types (`RemoteApiError`, `AuthenticationError`, `OAuth1Error`,
//!   `AuthorizationError`) and the uniform error message formatter
//! - Authentication tokens and user credential material
//! - Request vocabulary (HTTP methods, API metric categories)
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other Bridgekit crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod credentials;
pub mod errors;
pub mod macros;
pub mod token;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use credentials::{KeyStore, UserCredential};
pub use errors::*;
pub use token::AuthenticationToken;
pub use types::*;
