//! Drawdown from running peak.
//!
//! DD[i] = P[i] / max(P[0..=i]) - 1. Always <= 0, exactly 0 at a new high.

use crate::domain::error::InvalidInputError;
use crate::domain::indicator::ensure_non_empty;

pub fn compute_drawdown(prices: &[f64]) -> Result<Vec<f64>, InvalidInputError> {
    ensure_non_empty(prices, "drawdown")?;
    if let Some((i, p)) = prices.iter().enumerate().find(|(_, p)| !(**p > 0.0)) {
        return Err(InvalidInputError::new(format!(
            "drawdown: price at index {i} must be positive, got {p}"
        )));
    }

    let mut peak = f64::MIN;
    Ok(prices
        .iter()
        .map(|&p| {
            if p >= peak {
                peak = p;
                0.0
            } else {
                p / peak - 1.0
            }
        })
        .collect())
}
