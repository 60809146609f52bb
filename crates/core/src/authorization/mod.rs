//! Third-party authorization port

pub mod ports;
