//! history-hex: hexagonal order-history library (core + inbound HTTP)

pub mod config;
pub mod errors;

pub mod application;

pub use history_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
