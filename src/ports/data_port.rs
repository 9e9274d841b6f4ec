//! Data access port trait.
//!
//! The engine never calls this; the orchestration layer fetches and hands the
//! resulting series to the engine.

use crate::domain::error::SignalboardError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::period::Period;

pub trait DataPort {
    /// Daily bars for `symbol` covering `period`, ending at the latest available bar.
    fn fetch_ohlcv(&self, symbol: &str, period: Period) -> Result<PriceSeries, SignalboardError>;

    fn list_symbols(&self) -> Result<Vec<String>, SignalboardError>;
}
