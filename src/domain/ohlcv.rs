//! Daily OHLCV bars and validated price series.

use crate::domain::error::InvalidInputError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: Option<f64>,
    pub volume: f64,
}

impl OhlcvBar {
    /// Adjusted close when present, otherwise close.
    pub fn price(&self) -> f64 {
        self.adjusted_close.unwrap_or(self.close)
    }

    /// A bar built from a single price, as used for price-only volatility tables.
    pub fn from_price(date: NaiveDate, price: f64) -> Self {
        Self {
            date,
            open: price,
            high: price,
            low: price,
            close: price,
            adjusted_close: None,
            volume: 0.0,
        }
    }
}

/// A date-ordered sequence of daily bars for one symbol.
///
/// Dates are strictly increasing. Gaps (non-trading days) are allowed and never filled.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, InvalidInputError> {
        let symbol = symbol.into();

        for (i, bar) in bars.iter().enumerate() {
            let fields = [bar.open, bar.high, bar.low, bar.close, bar.volume];
            if fields.iter().any(|v| !v.is_finite())
                || bar.adjusted_close.is_some_and(|v| !v.is_finite())
            {
                return Err(InvalidInputError::new(format!(
                    "{symbol}: non-finite value on {}",
                    bar.date
                )));
            }
            if bar.volume < 0.0 {
                return Err(InvalidInputError::new(format!(
                    "{symbol}: negative volume on {}",
                    bar.date
                )));
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(InvalidInputError::new(format!(
                    "{symbol}: dates must be strictly increasing ({} follows {})",
                    bar.date,
                    bars[i - 1].date
                )));
            }
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Adjusted close, falling back to close per bar.
    pub fn prices(&self) -> Vec<f64> {
        self.bars.iter().map(OhlcvBar::price).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Bars dated on or after `start`.
    pub fn since(&self, start: NaiveDate) -> PriceSeries {
        PriceSeries {
            symbol: self.symbol.clone(),
            bars: self
                .bars
                .iter()
                .filter(|b| b.date >= start)
                .cloned()
                .collect(),
        }
    }
}
