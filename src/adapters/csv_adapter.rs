//! CSV file data adapter.
//!
//! One file per symbol, `<dir>/<symbol>.csv`, in the layout market-data downloads
//! use: `Date,Open,High,Low,Close,Adj Close,Volume`. Headers are matched by name,
//! case-insensitively. Only `Date` and `Close` are required, so price-only
//! volatility tables load as well.

use crate::domain::error::SignalboardError;
use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
use crate::domain::period::Period;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// Column positions resolved from the header row.
struct Layout {
    date: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: usize,
    adjusted_close: Option<usize>,
    volume: Option<usize>,
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, String> {
        let find = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = normalize_header(h);
                names.contains(&h.as_str())
            })
        };
        Ok(Self {
            date: find(&["date", "datetime"]).ok_or("missing Date column")?,
            open: find(&["open"]),
            high: find(&["high"]),
            low: find(&["low"]),
            close: find(&["close"]).ok_or("missing Close column")?,
            adjusted_close: find(&["adjclose", "adjustedclose"]),
            volume: find(&["volume"]),
        })
    }
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// File stem for `symbol`: index tickers like `^GSPC` map to `GSPC`.
pub fn sanitize_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Accept a trailing time part: "2024-01-15 00:00:00-05:00" or "2024-01-15T00:00:00".
    let day = raw.trim().split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn cell<'a>(record: &'a csv::StringRecord, index: Option<usize>) -> Option<&'a str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", sanitize_symbol(symbol)))
    }

    fn read_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, SignalboardError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SignalboardError::NoData {
                    symbol: symbol.to_string(),
                }
            } else {
                SignalboardError::Data {
                    reason: format!("failed to read {}: {}", path.display(), e),
                }
            }
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| SignalboardError::Data {
            reason: format!("{}: CSV header error: {}", path.display(), e),
        })?;
        let layout = Layout::from_headers(headers).map_err(|reason| SignalboardError::Data {
            reason: format!("{}: {}", path.display(), reason),
        })?;

        let mut bars = Vec::new();
        let mut skipped = 0usize;

        for (row, result) in rdr.records().enumerate() {
            // Header is line 1.
            let line = row + 2;
            let record = result.map_err(|e| SignalboardError::Data {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;

            let number = |index: Option<usize>, name: &str| -> Result<Option<f64>, SignalboardError> {
                cell(&record, index)
                    .map(|raw| {
                        raw.parse::<f64>().map_err(|_| SignalboardError::Data {
                            reason: format!(
                                "{}:{}: invalid {} value '{}'",
                                path.display(),
                                line,
                                name,
                                raw
                            ),
                        })
                    })
                    .transpose()
            };

            let date_raw = cell(&record, Some(layout.date)).unwrap_or_default();
            let date = parse_date(date_raw).ok_or_else(|| SignalboardError::Data {
                reason: format!("{}:{}: invalid date '{}'", path.display(), line, date_raw),
            })?;

            let Some(close) = number(Some(layout.close), "close")? else {
                warn!(symbol, %date, line, "skipping row with blank close");
                skipped += 1;
                continue;
            };

            bars.push(OhlcvBar {
                date,
                open: number(layout.open, "open")?.unwrap_or(close),
                high: number(layout.high, "high")?.unwrap_or(close),
                low: number(layout.low, "low")?.unwrap_or(close),
                close,
                adjusted_close: number(layout.adjusted_close, "adjusted close")?,
                volume: number(layout.volume, "volume")?.unwrap_or(0.0),
            });
        }

        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(SignalboardError::Data {
                reason: format!("{}: duplicate date {}", path.display(), pair[0].date),
            });
        }

        debug!(symbol, path = %path.display(), rows = bars.len(), skipped, "read csv");
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(&self, symbol: &str, period: Period) -> Result<PriceSeries, SignalboardError> {
        let bars = self.read_bars(symbol)?;
        let series = PriceSeries::new(symbol, bars).map_err(|e| SignalboardError::Data {
            reason: e.reason,
        })?;

        let series = match series.last_date().and_then(|last| period.start_from(last)) {
            Some(start) => series.since(start),
            None => series,
        };
        if series.is_empty() {
            return Err(SignalboardError::NoData {
                symbol: symbol.to_string(),
            });
        }

        info!(
            symbol,
            %period,
            bars = series.len(),
            first = ?series.first_date(),
            last = ?series.last_date(),
            "loaded price history"
        );
        Ok(series)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SignalboardError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SignalboardError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SignalboardError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".csv") {
                symbols.push(stem.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
