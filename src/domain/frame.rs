//! Indicator frame: the price series plus one derived column per indicator.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::indicator::Series;
use crate::domain::ohlcv::OhlcvBar;

/// Derived columns addressable from rules and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Drawdown,
    Rsi,
    SmaFast,
    SmaSlow,
    Ema,
    Macd,
    MacdSignal,
    BbUpper,
    BbMiddle,
    BbLower,
    StochK,
    StochD,
    Obv,
}

impl Column {
    pub const ALL: [Column; 13] = [
        Column::Drawdown,
        Column::Rsi,
        Column::SmaFast,
        Column::SmaSlow,
        Column::Ema,
        Column::Macd,
        Column::MacdSignal,
        Column::BbUpper,
        Column::BbMiddle,
        Column::BbLower,
        Column::StochK,
        Column::StochD,
        Column::Obv,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Drawdown => "drawdown",
            Column::Rsi => "rsi",
            Column::SmaFast => "sma_fast",
            Column::SmaSlow => "sma_slow",
            Column::Ema => "ema",
            Column::Macd => "macd",
            Column::MacdSignal => "macd_signal",
            Column::BbUpper => "bb_upper",
            Column::BbMiddle => "bb_middle",
            Column::BbLower => "bb_lower",
            Column::StochK => "stoch_k",
            Column::StochD => "stoch_d",
            Column::Obv => "obv",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown column '{}'", s))
    }
}

/// The primary series augmented with derived columns, one value per date.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub symbol: String,
    pub bars: Vec<OhlcvBar>,
    pub drawdown: Series,
    pub rsi: Series,
    pub sma_fast: Series,
    pub sma_slow: Series,
    pub ema: Series,
    pub macd: Series,
    pub macd_signal: Series,
    pub macd_crossover: Vec<bool>,
    pub bb_upper: Series,
    pub bb_middle: Series,
    pub bb_lower: Series,
    pub stoch_k: Series,
    pub stoch_d: Series,
    pub obv: Series,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn date(&self, index: usize) -> NaiveDate {
        self.bars[index].date
    }

    pub fn column(&self, column: Column) -> &Series {
        match column {
            Column::Drawdown => &self.drawdown,
            Column::Rsi => &self.rsi,
            Column::SmaFast => &self.sma_fast,
            Column::SmaSlow => &self.sma_slow,
            Column::Ema => &self.ema,
            Column::Macd => &self.macd,
            Column::MacdSignal => &self.macd_signal,
            Column::BbUpper => &self.bb_upper,
            Column::BbMiddle => &self.bb_middle,
            Column::BbLower => &self.bb_lower,
            Column::StochK => &self.stoch_k,
            Column::StochD => &self.stoch_d,
            Column::Obv => &self.obv,
        }
    }

    /// Value of `column` at `index`; `None` during warm-up or past the end.
    pub fn value(&self, column: Column, index: usize) -> Option<f64> {
        self.column(column).get(index).copied().flatten()
    }
}
