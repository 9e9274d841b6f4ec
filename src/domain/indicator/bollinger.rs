//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (num_std × StdDev)
//! - Lower: Middle - (num_std × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Default parameters: window=20, num_std=2.0. Warmup: first (window-1) positions are null.

use crate::domain::error::InvalidInputError;
use crate::domain::indicator::{compute_rolling_stddev, compute_sma, Series};

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_NUM_STD: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

pub fn compute_bollinger_bands(
    prices: &[f64],
    window: usize,
    num_std: f64,
) -> Result<BollingerBands, InvalidInputError> {
    if !(num_std >= 0.0) || !num_std.is_finite() {
        return Err(InvalidInputError::new(format!(
            "bollinger: num_std must be a non-negative number, got {num_std}"
        )));
    }

    let middle = compute_sma(prices, window)?;
    let stddev = compute_rolling_stddev(prices, window)?;

    let mut upper = Vec::with_capacity(prices.len());
    let mut lower = Vec::with_capacity(prices.len());
    for (mid, sd) in middle.iter().zip(&stddev) {
        match (mid, sd) {
            (Some(mid), Some(sd)) => {
                upper.push(Some(mid + num_std * sd));
                lower.push(Some(mid - num_std * sd));
            }
            _ => {
                upper.push(None);
                lower.push(None);
            }
        }
    }

    Ok(BollingerBands {
        upper,
        middle,
        lower,
    })
}
