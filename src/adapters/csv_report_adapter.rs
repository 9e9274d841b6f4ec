//! CSV report adapter: one row per date with prices, every indicator column,
//! the aligned volatility level and both scores. Null values are blank cells.

use std::fs::File;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::engine::EngineOutput;
use crate::domain::error::SignalboardError;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Serialize)]
struct ReportRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    adjusted_close: Option<f64>,
    volume: f64,
    drawdown: Option<f64>,
    rsi: Option<f64>,
    sma_fast: Option<f64>,
    sma_slow: Option<f64>,
    ema: Option<f64>,
    macd: Option<f64>,
    macd_signal: Option<f64>,
    macd_crossover: bool,
    bb_upper: Option<f64>,
    bb_middle: Option<f64>,
    bb_lower: Option<f64>,
    stoch_k: Option<f64>,
    stoch_d: Option<f64>,
    obv: Option<f64>,
    volatility: Option<f64>,
    volatility_trend: Option<f64>,
    buy_score: u32,
    sell_score: u32,
}

fn rows(output: &EngineOutput) -> Vec<ReportRow> {
    let frame = &output.frame;
    frame
        .bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let at = |series: &[Option<f64>]| series.get(i).copied().flatten();
            let flags = output
                .volatility
                .as_ref()
                .map(|ctx| ctx.flags_at(i))
                .unwrap_or_default();
            let score = output.scores.get(i);
            ReportRow {
                date: bar.date.format("%Y-%m-%d").to_string(),
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                adjusted_close: bar.adjusted_close,
                volume: bar.volume,
                drawdown: at(&frame.drawdown),
                rsi: at(&frame.rsi),
                sma_fast: at(&frame.sma_fast),
                sma_slow: at(&frame.sma_slow),
                ema: at(&frame.ema),
                macd: at(&frame.macd),
                macd_signal: at(&frame.macd_signal),
                macd_crossover: frame.macd_crossover.get(i).copied().unwrap_or(false),
                bb_upper: at(&frame.bb_upper),
                bb_middle: at(&frame.bb_middle),
                bb_lower: at(&frame.bb_lower),
                stoch_k: at(&frame.stoch_k),
                stoch_d: at(&frame.stoch_d),
                obv: at(&frame.obv),
                volatility: flags.level,
                volatility_trend: flags.trend,
                buy_score: score.map_or(0, |s| s.buy_score),
                sell_score: score.map_or(0, |s| s.sell_score),
            }
        })
        .collect()
}

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, output: &EngineOutput, path: &Path) -> Result<(), SignalboardError> {
        let report_err = |e: csv::Error| SignalboardError::Report {
            reason: format!("{}: {}", path.display(), e),
        };

        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        let rows = rows(output);
        for row in &rows {
            writer.serialize(row).map_err(report_err)?;
        }
        writer.flush()?;

        info!(path = %path.display(), rows = rows.len(), "report written");
        Ok(())
    }
}
