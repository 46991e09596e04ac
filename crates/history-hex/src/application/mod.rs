pub mod device;
pub mod history_service;
pub mod persisted_store;
