//! Stochastic Oscillator.
//!
//! raw %K[i] = 100 * (C[i] - LL(n)) / (HH(n) - LL(n)), where HH/LL are the highest high
//! and lowest low over the trailing n bars. A zero range yields null, not infinity.
//! %K = SMA(smooth) of raw %K, %D = SMA(smooth) of %K. `smooth = 1` disables smoothing.
//!
//! Default parameters: window=14, smooth=3.

use crate::domain::error::InvalidInputError;
use crate::domain::indicator::{
    ensure_non_empty, ensure_same_len, ensure_window, rolling_mean, Series,
};

pub const DEFAULT_WINDOW: usize = 14;
pub const DEFAULT_SMOOTH: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Stochastic {
    pub k: Series,
    pub d: Series,
}

pub fn compute_stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    window: usize,
    smooth: usize,
) -> Result<Stochastic, InvalidInputError> {
    ensure_non_empty(close, "stochastic")?;
    ensure_same_len(
        &[("high", high.len()), ("low", low.len()), ("close", close.len())],
        "stochastic",
    )?;
    ensure_window(window, "stochastic")?;
    ensure_window(smooth, "stochastic smoothing")?;

    let raw_k: Series = (0..close.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let start = i + 1 - window;
            let highest = high[start..=i].iter().copied().fold(f64::MIN, f64::max);
            let lowest = low[start..=i].iter().copied().fold(f64::MAX, f64::min);
            let range = highest - lowest;
            if range == 0.0 {
                None
            } else {
                Some(100.0 * (close[i] - lowest) / range)
            }
        })
        .collect();

    let k = if smooth == 1 {
        raw_k
    } else {
        rolling_mean(&raw_k, smooth)
    };
    let d = rolling_mean(&k, smooth);

    Ok(Stochastic { k, d })
}
