//! Rolling standard deviation.
//!
//! Population standard deviation over the trailing n values:
//! STDDEV(n)[i] = sqrt(sum((P[i-j] - SMA(n)[i])^2 for j in 0..n) / n)
//! Warmup: first (n-1) positions are null.

use crate::domain::error::InvalidInputError;
use crate::domain::indicator::{ensure_non_empty, ensure_window, Series};

pub fn compute_rolling_stddev(prices: &[f64], window: usize) -> Result<Series, InvalidInputError> {
    ensure_non_empty(prices, "stddev")?;
    ensure_window(window, "stddev")?;

    Ok((0..prices.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &prices[i + 1 - window..=i];
            let mean = slice.iter().sum::<f64>() / window as f64;
            let variance = slice
                .iter()
                .map(|p| {
                    let diff = p - mean;
                    diff * diff
                })
                .sum::<f64>()
                / window as f64;
            Some(variance.sqrt())
        })
        .collect())
}
