//! Indicator engine: raw price table to indicator frame to buy/sell scores.
//!
//! Pure and synchronous. The engine never fetches, logs, or retries; it accepts
//! whatever series it is handed.

use crate::domain::error::InvalidInputError;
use crate::domain::frame::IndicatorFrame;
use crate::domain::indicator::{
    self, bullish_crossovers, compute_bollinger_bands, compute_drawdown, compute_macd,
    compute_moving_averages, compute_obv, compute_rsi, compute_stochastic, Series,
};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::rule::RuleSet;
use crate::domain::score::{compute_scores, ScoreRow};
use crate::domain::volatility::{VolatilityContext, VolatilityThresholds};

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub rsi_window: usize,
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub ema_span: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_window: usize,
    pub bollinger_num_std: f64,
    pub stoch_window: usize,
    pub stoch_smooth: usize,
    pub volatility: VolatilityThresholds,
    /// Reject series shorter than a configured window instead of emitting null columns.
    pub strict_windows: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rsi_window: indicator::rsi::DEFAULT_WINDOW,
            sma_fast: 50,
            sma_slow: 200,
            ema_span: 20,
            macd_fast: indicator::macd::DEFAULT_FAST,
            macd_slow: indicator::macd::DEFAULT_SLOW,
            macd_signal: indicator::macd::DEFAULT_SIGNAL,
            bollinger_window: indicator::bollinger::DEFAULT_WINDOW,
            bollinger_num_std: indicator::bollinger::DEFAULT_NUM_STD,
            stoch_window: indicator::stochastic::DEFAULT_WINDOW,
            stoch_smooth: indicator::stochastic::DEFAULT_SMOOTH,
            volatility: VolatilityThresholds::default(),
            strict_windows: false,
        }
    }
}

impl EngineConfig {
    /// Named windows, in the order they are reported.
    pub fn windows(&self) -> [(&'static str, usize); 9] {
        [
            ("rsi_window", self.rsi_window),
            ("sma_fast", self.sma_fast),
            ("sma_slow", self.sma_slow),
            ("ema_span", self.ema_span),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_window", self.bollinger_window),
            ("stoch_window", self.stoch_window),
        ]
    }

    /// Bars each column needs before its first value, counting the stochastic
    /// smoothing passes on top of its window.
    pub fn warmups(&self) -> Vec<(&'static str, usize)> {
        let mut warmups = self.windows().to_vec();
        warmups.push((
            "stoch_d",
            self.stoch_window + 2 * self.stoch_smooth.saturating_sub(1),
        ));
        warmups
    }

    pub fn longest_window(&self) -> usize {
        self.warmups().iter().map(|(_, w)| *w).max().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), InvalidInputError> {
        for (name, window) in self.windows() {
            if window == 0 {
                return Err(InvalidInputError::new(format!("{name} must be at least 1")));
            }
        }
        if self.stoch_smooth == 0 {
            return Err(InvalidInputError::new("stoch_smooth must be at least 1"));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(InvalidInputError::new(format!(
                "macd_fast ({}) must be less than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if self.sma_fast > self.sma_slow {
            return Err(InvalidInputError::new(format!(
                "sma_fast ({}) must not exceed sma_slow ({})",
                self.sma_fast, self.sma_slow
            )));
        }
        if !(self.bollinger_num_std >= 0.0) || !self.bollinger_num_std.is_finite() {
            return Err(InvalidInputError::new(format!(
                "bollinger_num_std must be a non-negative number, got {}",
                self.bollinger_num_std
            )));
        }
        self.volatility.validate()
    }
}

/// Everything one engine invocation produces.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub frame: IndicatorFrame,
    pub volatility: Option<VolatilityContext>,
    pub scores: Vec<ScoreRow>,
}

/// Computes every indicator column over `series`.
///
/// Indicators that lack history produce nulls for the affected dates. With
/// `strict_windows`, a window that is not shorter than the series is an error instead.
pub fn compute_frame(
    series: &PriceSeries,
    config: &EngineConfig,
) -> Result<IndicatorFrame, InvalidInputError> {
    config.validate()?;
    if series.is_empty() {
        return Err(InvalidInputError::new(format!(
            "{}: empty price series",
            series.symbol()
        )));
    }
    if config.strict_windows {
        if let Some((name, window)) = config
            .warmups()
            .into_iter()
            .find(|(_, w)| *w >= series.len())
        {
            return Err(InvalidInputError::new(format!(
                "{}: {name} = {window} needs more than {} bars",
                series.symbol(),
                series.len()
            )));
        }
    }

    let prices = series.prices();

    let drawdown = compute_drawdown(&prices)?;
    let rsi = compute_rsi(&prices, config.rsi_window)?;
    let averages = compute_moving_averages(
        &prices,
        &[config.sma_fast, config.sma_slow],
        Some(config.ema_span),
    )?;
    let macd = compute_macd(&prices, config.macd_fast, config.macd_slow, config.macd_signal)?;
    let macd_crossover = bullish_crossovers(&macd.line, &macd.signal);
    let bands = compute_bollinger_bands(&prices, config.bollinger_window, config.bollinger_num_std)?;
    let stoch = compute_stochastic(
        &series.highs(),
        &series.lows(),
        &series.closes(),
        config.stoch_window,
        config.stoch_smooth,
    )?;
    let obv = compute_obv(&series.closes(), &series.volumes())?;

    let column = |window: usize| -> Series {
        averages
            .sma
            .get(&window)
            .cloned()
            .unwrap_or_else(|| vec![None; prices.len()])
    };
    let ema = averages
        .ema
        .as_ref()
        .map(|(_, values)| defined(values))
        .unwrap_or_else(|| vec![None; prices.len()]);

    Ok(IndicatorFrame {
        symbol: series.symbol().to_string(),
        bars: series.bars().to_vec(),
        drawdown: defined(&drawdown),
        rsi,
        sma_fast: column(config.sma_fast),
        sma_slow: column(config.sma_slow),
        ema,
        macd: defined(&macd.line),
        macd_signal: defined(&macd.signal),
        macd_crossover,
        bb_upper: bands.upper,
        bb_middle: bands.middle,
        bb_lower: bands.lower,
        stoch_k: stoch.k,
        stoch_d: stoch.d,
        obv: defined(&obv),
    })
}

/// Full pipeline: frame, optional aligned volatility context, scores.
pub fn run(
    series: &PriceSeries,
    volatility: Option<&PriceSeries>,
    config: &EngineConfig,
    rules: &RuleSet,
) -> Result<EngineOutput, InvalidInputError> {
    let frame = compute_frame(series, config)?;
    let volatility = volatility
        .map(|vol| VolatilityContext::align(series, vol, &config.volatility))
        .transpose()?;
    let scores = compute_scores(&frame, volatility.as_ref(), rules)?;

    Ok(EngineOutput {
        frame,
        volatility,
        scores,
    })
}

fn defined(values: &[f64]) -> Series {
    values.iter().map(|v| Some(*v)).collect()
}
