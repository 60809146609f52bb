//! # Bridgekit Core
//!
//! Port layer - no HTTP library, no I/O.
//!
//! This crate contains:
//! - The decorated API client contract and its typed helpers
//! - The Authentication Proxy contract
//! - The transport and entity serializer capabilities
//! - The authorized integration contract
//!
//! ## Architecture Principles
//! - Only depends on `bridgekit-domain`
//! - All external collaborators reached through traits
//! - Implementations live in `bridgekit-infra`

pub mod api;
pub mod auth;
pub mod authorization;
pub mod serializer;
pub mod transport;

pub use api::{ApiRequest, ApiResponse, Headers, HttpApiClient, HttpApiClientExt, QueryParams};
pub use auth::ports::AuthenticationProxy;
pub use authorization::ports::{AuthorizationPayload, AuthorizedIntegration};
pub use serializer::{EntitySerializer, JsonEntitySerializer, SerializationError};
pub use transport::{
    HttpTransport, TransportError, TransportErrorKind, TransportFactory, TransportRequest,
    TransportResponse,
};
