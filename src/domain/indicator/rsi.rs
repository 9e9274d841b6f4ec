//! RSI (Relative Strength Index).
//!
//! Simple (unweighted) rolling means of gains and losses over the last `window`
//! price changes:
//! RS = mean(gains) / mean(|losses|), RSI = 100 - 100 / (1 + RS).
//! If the mean loss is zero the RSI is 100.
//!
//! Warmup: the first `window` positions are null (they have fewer than `window` changes).
//! Input shorter than `window + 1` yields an all-null series of the same length
//! instead of an error, so short histories degrade to "no signal".

use crate::domain::error::InvalidInputError;
use crate::domain::indicator::Series;

pub const DEFAULT_WINDOW: usize = 14;

pub fn compute_rsi(prices: &[f64], window: usize) -> Result<Series, InvalidInputError> {
    if window < 1 {
        return Err(InvalidInputError::new("rsi: window must be at least 1"));
    }
    if prices.len() < window + 1 {
        return Ok(vec![None; prices.len()]);
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);
    for pair in prices.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut values = vec![None; window];
    for i in window..prices.len() {
        // Changes i-window+1 ..= i live at gains[i-window .. i].
        let avg_gain = gains[i - window..i].iter().sum::<f64>() / window as f64;
        let avg_loss = losses[i - window..i].iter().sum::<f64>() / window as f64;
        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };
        values.push(Some(rsi));
    }

    Ok(values)
}
