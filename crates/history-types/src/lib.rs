//! history-types: domain model and storage port for the order history store

pub mod domain;
pub mod ports;
