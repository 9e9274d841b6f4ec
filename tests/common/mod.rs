#![allow(dead_code)]

use chrono::NaiveDate;
pub use signalboard::domain::ohlcv::{OhlcvBar, PriceSeries};
use signalboard::domain::error::SignalboardError;
use signalboard::domain::period::Period;
use signalboard::ports::data_port::DataPort;
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory data port. Records every fetch so tests can assert call order.
pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub fetched: RefCell<Vec<(String, Period)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetched: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(&self, symbol: &str, period: Period) -> Result<PriceSeries, SignalboardError> {
        self.fetched.borrow_mut().push((symbol.to_string(), period));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SignalboardError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => Ok(PriceSeries::new(symbol, bars.clone())?),
            _ => Err(SignalboardError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, SignalboardError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        adjusted_close: None,
        volume: 1000.0,
    }
}

/// One bar per calendar day from `start_date`, closes taken from `closes`.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            adjusted_close: None,
            volume: 1000.0 + i as f64,
        })
        .collect()
}

/// A rise, a sharp sell-off, then a recovery: exercises both sides of the rule table.
pub fn cycle_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            if i < count / 3 {
                100.0 + t
            } else if i < 2 * count / 3 {
                100.0 + (count / 3) as f64 - 2.0 * (t - (count / 3) as f64)
            } else {
                100.0 - (count / 3) as f64 + 1.5 * (t - (2 * count / 3) as f64)
            }
        })
        .collect()
}

pub fn generate_series(symbol: &str, start_date: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(symbol, bars_from_closes(start_date, closes)).unwrap()
}
