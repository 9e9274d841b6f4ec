//! Simple Moving Average and the multi-window moving average bundle.
//!
//! SMA(n)[i] = mean(P[i-n+1..=i]). Warmup: first (n-1) positions are null.

use std::collections::BTreeMap;

use crate::domain::error::InvalidInputError;
use crate::domain::indicator::{compute_ema, ensure_non_empty, ensure_window, Series};

pub fn compute_sma(prices: &[f64], window: usize) -> Result<Series, InvalidInputError> {
    ensure_non_empty(prices, "sma")?;
    ensure_window(window, "sma")?;

    Ok((0..prices.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &prices[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect())
}

/// Simple moving averages keyed by window, plus an optional EMA.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverages {
    pub sma: BTreeMap<usize, Series>,
    pub ema: Option<(usize, Vec<f64>)>,
}

/// Computes one SMA per requested window and, when `ema_span` is given, the EMA.
pub fn compute_moving_averages(
    prices: &[f64],
    windows: &[usize],
    ema_span: Option<usize>,
) -> Result<MovingAverages, InvalidInputError> {
    let mut sma = BTreeMap::new();
    for &window in windows {
        if !sma.contains_key(&window) {
            sma.insert(window, compute_sma(prices, window)?);
        }
    }

    let ema = match ema_span {
        Some(span) => Some((span, compute_ema(prices, span)?)),
        None => None,
    };

    Ok(MovingAverages { sma, ema })
}
