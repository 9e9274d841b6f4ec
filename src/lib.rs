//! signalboard: technical indicator and buy/sell scoring engine for daily index data.
//!
//! Hexagonal architecture: pure indicator and scoring logic in [`domain`], port traits
//! in [`ports`], concrete file-backed implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod logging;
