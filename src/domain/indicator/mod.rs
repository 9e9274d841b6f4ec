//! Technical indicator implementations.
//!
//! Every indicator works on plain price slices and returns one value per input
//! position. Columns with a warm-up window use [`Series`], where `None` marks dates
//! that do not yet have enough history.

pub mod bollinger;
pub mod drawdown;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;

pub use bollinger::{compute_bollinger_bands, BollingerBands};
pub use drawdown::compute_drawdown;
pub use ema::compute_ema;
pub use macd::{bullish_crossovers, compute_macd, Macd};
pub use obv::compute_obv;
pub use rsi::compute_rsi;
pub use sma::{compute_moving_averages, compute_sma, MovingAverages};
pub use stddev::compute_rolling_stddev;
pub use stochastic::{compute_stochastic, Stochastic};

use crate::domain::error::InvalidInputError;

/// A nullable indicator column.
pub type Series = Vec<Option<f64>>;

pub(crate) fn ensure_non_empty(values: &[f64], what: &str) -> Result<(), InvalidInputError> {
    if values.is_empty() {
        return Err(InvalidInputError::new(format!("{what}: empty input")));
    }
    Ok(())
}

pub(crate) fn ensure_window(window: usize, what: &str) -> Result<(), InvalidInputError> {
    if window == 0 {
        return Err(InvalidInputError::new(format!("{what}: window must be at least 1")));
    }
    Ok(())
}

pub(crate) fn ensure_same_len(
    lens: &[(&str, usize)],
    what: &str,
) -> Result<(), InvalidInputError> {
    if let Some((_, first)) = lens.first() {
        if let Some((name, len)) = lens.iter().find(|(_, len)| len != first) {
            return Err(InvalidInputError::new(format!(
                "{what}: {name} has {len} values, expected {first}"
            )));
        }
    }
    Ok(())
}

/// Trailing mean over a nullable column. A window containing any null is null.
pub(crate) fn rolling_mean(values: &[Option<f64>], window: usize) -> Series {
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let mut sum = 0.0;
            for v in slice {
                sum += (*v)?;
            }
            Some(sum / window as f64)
        })
        .collect()
}
