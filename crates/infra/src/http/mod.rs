//! HTTP transport implementations

pub mod client;

pub use client::{load_trust_store, ReqwestTransport, ReqwestTransportBuilder, ReqwestTransportFactory};
