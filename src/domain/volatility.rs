//! Volatility-index context aligned to the primary series.
//!
//! Level and trend are computed on the volatility series' own dates, then the latest
//! available observation is forward-filled onto each primary date. Trend is the mean
//! of the last `trend_lookback` day-over-day differences.

use crate::domain::error::InvalidInputError;
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_ELEVATED: f64 = 25.0;
pub const DEFAULT_DEPRESSED: f64 = 15.0;
pub const DEFAULT_TREND_LOOKBACK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityThresholds {
    pub elevated: f64,
    pub depressed: f64,
    pub trend_lookback: usize,
}

impl Default for VolatilityThresholds {
    fn default() -> Self {
        Self {
            elevated: DEFAULT_ELEVATED,
            depressed: DEFAULT_DEPRESSED,
            trend_lookback: DEFAULT_TREND_LOOKBACK,
        }
    }
}

impl VolatilityThresholds {
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        if self.trend_lookback == 0 {
            return Err(InvalidInputError::new(
                "volatility: trend_lookback must be at least 1",
            ));
        }
        if !(self.depressed <= self.elevated) {
            return Err(InvalidInputError::new(format!(
                "volatility: depressed threshold {} exceeds elevated threshold {}",
                self.depressed, self.elevated
            )));
        }
        Ok(())
    }
}

/// Volatility state on one primary date.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VolatilityFlags {
    pub level: Option<f64>,
    pub trend: Option<f64>,
    pub elevated_and_falling: bool,
    pub depressed_or_rising: bool,
}

impl VolatilityFlags {
    fn classify(level: f64, trend: Option<f64>, thresholds: &VolatilityThresholds) -> Self {
        let falling = trend.is_some_and(|t| t < 0.0);
        let rising = trend.is_some_and(|t| t > 0.0);
        Self {
            level: Some(level),
            trend,
            elevated_and_falling: level > thresholds.elevated && falling,
            depressed_or_rising: level < thresholds.depressed || rising,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityContext {
    symbol: String,
    flags: Vec<VolatilityFlags>,
}

impl VolatilityContext {
    /// Aligns `volatility` onto the dates of `primary`.
    ///
    /// Primary dates before the first volatility observation get default (all-false) flags.
    pub fn align(
        primary: &PriceSeries,
        volatility: &PriceSeries,
        thresholds: &VolatilityThresholds,
    ) -> Result<Self, InvalidInputError> {
        thresholds.validate()?;

        let levels = volatility.prices();
        let lookback = thresholds.trend_lookback;
        let native: Vec<VolatilityFlags> = (0..levels.len())
            .map(|i| {
                let trend = (i >= lookback)
                    .then(|| (levels[i] - levels[i - lookback]) / lookback as f64);
                VolatilityFlags::classify(levels[i], trend, thresholds)
            })
            .collect();

        let vol_bars = volatility.bars();
        let mut flags = Vec::with_capacity(primary.len());
        // `seen` counts volatility bars dated on or before the current primary date.
        let mut seen = 0;
        for bar in primary.bars() {
            while seen < vol_bars.len() && vol_bars[seen].date <= bar.date {
                seen += 1;
            }
            flags.push(if seen == 0 {
                VolatilityFlags::default()
            } else {
                native[seen - 1]
            });
        }

        Ok(Self {
            symbol: volatility.symbol().to_string(),
            flags,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn flags(&self) -> &[VolatilityFlags] {
        &self.flags
    }

    pub fn flags_at(&self, index: usize) -> VolatilityFlags {
        self.flags.get(index).copied().unwrap_or_default()
    }
}
