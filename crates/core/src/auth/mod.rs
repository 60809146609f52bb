//! Authentication Proxy port

pub mod ports;
