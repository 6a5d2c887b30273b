//! Console services implementations

pub mod api_gateway;
pub mod config_storage;
pub mod health_monitor;

#[cfg(test)]
pub mod tests;

pub use api_gateway::*;
pub use config_storage::*;
pub use health_monitor::*;
