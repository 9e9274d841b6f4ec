//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! Both EMAs are seeded with the first value, so every position is defined.

use crate::domain::error::InvalidInputError;
use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{ensure_non_empty, ensure_window};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
}

impl Macd {
    pub fn histogram(&self) -> Vec<f64> {
        self.line
            .iter()
            .zip(&self.signal)
            .map(|(l, s)| l - s)
            .collect()
    }
}

pub fn compute_macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<Macd, InvalidInputError> {
    ensure_non_empty(prices, "macd")?;
    ensure_window(fast, "macd fast")?;
    ensure_window(slow, "macd slow")?;
    ensure_window(signal, "macd signal")?;

    let ema_fast = ema_values(prices, fast);
    let ema_slow = ema_values(prices, slow);
    let line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    let signal = ema_values(&line, signal);

    Ok(Macd { line, signal })
}

/// Bullish crossover flags: `line[i] > signal[i]` and `line[i-1] <= signal[i-1]`.
///
/// Fires once per crossing; index 0 is never flagged.
pub fn bullish_crossovers(line: &[f64], signal: &[f64]) -> Vec<bool> {
    let n = line.len().min(signal.len());
    (0..n)
        .map(|i| i > 0 && line[i] > signal[i] && line[i - 1] <= signal[i - 1])
        .collect()
}
