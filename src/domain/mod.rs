//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod frame;
pub mod volatility;
pub mod rule;
pub mod rule_parser;
pub mod rule_eval;
pub mod score;
pub mod engine;
pub mod period;
pub mod config_validation;
pub mod error;
