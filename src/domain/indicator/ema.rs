//! Exponential Moving Average.
//!
//! alpha = 2/(span+1), seeded with the first price, then
//! EMA[i] = alpha*P[i] + (1-alpha)*EMA[i-1]. Defined at every position.

use crate::domain::error::InvalidInputError;
use crate::domain::indicator::{ensure_non_empty, ensure_window};

pub fn compute_ema(prices: &[f64], span: usize) -> Result<Vec<f64>, InvalidInputError> {
    ensure_non_empty(prices, "ema")?;
    ensure_window(span, "ema")?;
    Ok(ema_values(prices, span))
}

/// Recurrence without validation, shared with MACD.
pub(crate) fn ema_values(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;

    for (i, &v) in values.iter().enumerate() {
        ema = if i == 0 {
            v
        } else {
            alpha * v + (1.0 - alpha) * ema
        };
        out.push(ema);
    }

    out
}
