//! Capability traits the orchestration layer injects.

pub mod config_port;
pub mod data_port;
pub mod report_port;
