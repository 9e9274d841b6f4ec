//! Integration tests for the scoring pipeline.
//!
//! Tests cover:
//! - Reference scenarios for drawdown, SMA, OBV and short-input RSI
//! - Full pipeline through a mock data port, with and without volatility data
//! - Rule set overrides flowing into scores
//! - CSV data adapter and CSV report adapter on disk

mod common;

use approx::assert_abs_diff_eq;
use common::*;
use signalboard::adapters::csv_adapter::CsvAdapter;
use signalboard::adapters::csv_report_adapter::CsvReportAdapter;
use signalboard::cli::{run_score_pipeline, ScoreRequest};
use signalboard::domain::engine::{compute_frame, run, EngineConfig};
use signalboard::domain::error::SignalboardError;
use signalboard::domain::frame::Column;
use signalboard::domain::indicator::{
    compute_drawdown, compute_moving_averages, compute_obv, compute_rsi,
};
use signalboard::domain::period::Period;
use signalboard::domain::rule::{RuleSet, ScoreRule, Side};
use signalboard::domain::rule_parser::parse;
use signalboard::domain::score::compute_scores;
use signalboard::ports::data_port::DataPort;
use signalboard::ports::report_port::ReportPort;
use std::fs;

fn short_config() -> EngineConfig {
    EngineConfig {
        rsi_window: 5,
        sma_fast: 5,
        sma_slow: 10,
        ema_span: 5,
        macd_fast: 3,
        macd_slow: 6,
        macd_signal: 3,
        bollinger_window: 5,
        stoch_window: 5,
        ..EngineConfig::default()
    }
}

mod reference_scenarios {
    use super::*;

    #[test]
    fn drawdown_and_sma_on_five_day_series() {
        let prices = [100.0, 90.0, 80.0, 95.0, 110.0];

        let dd = compute_drawdown(&prices).unwrap();
        for (got, want) in dd.iter().zip([0.0, -0.1, -0.2, -0.05, 0.0]) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-12);
        }

        let ma = compute_moving_averages(&prices, &[2], None).unwrap();
        assert_eq!(
            ma.sma[&2],
            vec![None, Some(95.0), Some(85.0), Some(87.5), Some(102.5)]
        );
        assert!(ma.ema.is_none());
    }

    #[test]
    fn obv_on_flat_volume() {
        let obv = compute_obv(&[10.0, 11.0, 10.0, 10.0, 12.0], &[100.0; 5]).unwrap();
        assert_eq!(obv, vec![0.0, 100.0, 0.0, 0.0, 100.0]);
    }

    #[test]
    fn rsi_short_input_is_all_null() {
        let rsi = compute_rsi(&[1.0, 2.0, 3.0], 14).unwrap();
        assert_eq!(rsi, vec![None, None, None]);
    }
}

mod full_pipeline {
    use super::*;

    #[test]
    fn pipeline_with_mock_data_port() {
        let closes = cycle_closes(90);
        let vix: Vec<f64> = (0..90).map(|i| 20.0 + (i as f64 / 9.0)).collect();
        let port = MockDataPort::new()
            .with_bars("^GSPC", bars_from_closes("2024-01-01", &closes))
            .with_bars("^VIX", bars_from_closes("2024-01-01", &vix));

        let request = ScoreRequest {
            symbol: "^GSPC".into(),
            volatility_symbol: Some("^VIX".into()),
            period: Period::Months(6),
        };
        let rules = RuleSet::default_rules();
        let output = run_score_pipeline(&port, &request, &short_config(), &rules).unwrap();

        assert_eq!(output.frame.len(), 90);
        assert_eq!(output.scores.len(), 90);
        assert!(output.volatility.is_some());
        assert_eq!(
            port.fetched.borrow().as_slice(),
            &[
                ("^GSPC".to_string(), Period::Months(6)),
                ("^VIX".to_string(), Period::Months(6))
            ]
        );

        for row in &output.scores {
            assert!(row.buy_score as usize <= rules.count(Side::Buy));
            assert!(row.sell_score as usize <= rules.count(Side::Sell));
        }

        // Peak of the rise: at the high, trend up, overbought.
        let peak = 29;
        assert_eq!(output.frame.value(Column::Drawdown, peak), Some(0.0));
        assert!(output.scores[peak].sell_score >= 3);
        // Bottom of the sell-off: deep drawdown, oversold.
        let trough = 59;
        assert!(output.frame.value(Column::Drawdown, trough).unwrap() < -0.1);
        assert!(output.scores[trough].buy_score >= 2);
    }

    #[test]
    fn missing_volatility_series_continues_without_it() {
        let port = MockDataPort::new()
            .with_bars("^GSPC", bars_from_closes("2024-01-01", &cycle_closes(30)))
            .with_error("^VIX", "feed down");
        let request = ScoreRequest {
            symbol: "^GSPC".into(),
            volatility_symbol: Some("^VIX".into()),
            period: Period::Max,
        };

        let output =
            run_score_pipeline(&port, &request, &short_config(), &RuleSet::default_rules())
                .unwrap();
        assert!(output.volatility.is_none());
        assert_eq!(output.scores.len(), 30);
    }

    #[test]
    fn missing_primary_series_is_no_data() {
        let port = MockDataPort::new();
        let request = ScoreRequest {
            symbol: "^GSPC".into(),
            volatility_symbol: None,
            period: Period::Max,
        };
        let err = run_score_pipeline(&port, &request, &short_config(), &RuleSet::default_rules())
            .unwrap_err();
        assert!(matches!(err, SignalboardError::NoData { .. }));
    }

    #[test]
    fn strict_windows_reports_insufficient_data() {
        let port = MockDataPort::new()
            .with_bars("^GSPC", bars_from_closes("2024-01-01", &cycle_closes(8)));
        let request = ScoreRequest {
            symbol: "^GSPC".into(),
            volatility_symbol: None,
            period: Period::Max,
        };
        let config = EngineConfig {
            strict_windows: true,
            ..short_config()
        };
        let err =
            run_score_pipeline(&port, &request, &config, &RuleSet::default_rules()).unwrap_err();
        assert!(matches!(
            err,
            SignalboardError::InsufficientData { bars: 8, minimum: 11, .. }
        ));
    }

    #[test]
    fn lenient_windows_leave_long_indicators_null() {
        let series = generate_series("^GSPC", "2024-01-01", &cycle_closes(30));
        let frame = compute_frame(&series, &EngineConfig::default()).unwrap();
        assert!(frame.sma_slow.iter().all(Option::is_none));
        assert!(frame.sma_fast.iter().all(Option::is_none));
        assert!(frame.rsi[14].is_some());
        assert!(frame.rsi[13].is_none());
    }

    #[test]
    fn volatility_dates_forward_fill_across_gaps() {
        let series = generate_series("^GSPC", "2024-01-01", &cycle_closes(10));
        // Volatility only reported every other day.
        let vix_bars: Vec<OhlcvBar> = bars_from_closes("2024-01-01", &[30.0; 10])
            .into_iter()
            .step_by(2)
            .collect();
        let vix = PriceSeries::new("^VIX", vix_bars).unwrap();

        let out = run(&series, Some(&vix), &short_config(), &RuleSet::default_rules()).unwrap();
        let ctx = out.volatility.unwrap();
        assert_eq!(ctx.len(), 10);
        assert!(ctx.flags().iter().all(|f| f.level == Some(30.0)));
    }
}

mod rule_overrides {
    use super::*;

    #[test]
    fn custom_rules_change_scores() {
        let series = generate_series("^GSPC", "2024-01-01", &cycle_closes(30));
        let frame = compute_frame(&series, &short_config()).unwrap();

        let mut rules = RuleSet::new(vec![]);
        rules.upsert(ScoreRule::new("always", Side::Buy, parse("ABOVE(close, 0)").unwrap()));
        rules.upsert(ScoreRule::new(
            "crossing",
            Side::Buy,
            parse("CROSS_ABOVE(macd, macd_signal)").unwrap(),
        ));

        let scores = compute_scores(&frame, None, &rules).unwrap();
        assert!(scores.iter().all(|r| r.buy_score >= 1 && r.sell_score == 0));
        for (i, row) in scores.iter().enumerate() {
            assert_eq!(row.buy_score == 2, frame.macd_crossover[i], "index {i}");
        }

        rules.disable("always").unwrap();
        let scores = compute_scores(&frame, None, &rules).unwrap();
        assert_eq!(
            scores.iter().filter(|r| r.buy_score == 1).count(),
            frame.macd_crossover.iter().filter(|c| **c).count()
        );
    }
}

mod file_adapters {
    use super::*;
    use tempfile::TempDir;

    fn write_symbol(dir: &std::path::Path, file: &str, closes: &[f64]) {
        let mut content = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
        for bar in bars_from_closes("2024-01-01", closes) {
            content.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                bar.date, bar.open, bar.high, bar.low, bar.close, bar.close, bar.volume
            ));
        }
        fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn csv_in_csv_out() {
        let dir = TempDir::new().unwrap();
        write_symbol(dir.path(), "GSPC.csv", &cycle_closes(60));
        write_symbol(dir.path(), "VIX.csv", &[22.0; 60]);

        let port = CsvAdapter::new(dir.path().to_path_buf());
        assert_eq!(port.list_symbols().unwrap(), vec!["GSPC", "VIX"]);

        let request = ScoreRequest {
            symbol: "^GSPC".into(),
            volatility_symbol: Some("^VIX".into()),
            period: Period::Days(30),
        };
        let output =
            run_score_pipeline(&port, &request, &short_config(), &RuleSet::default_rules())
                .unwrap();
        assert_eq!(output.frame.len(), 30);
        assert_eq!(output.frame.bars[0].date, date(2024, 1, 31));

        let report = dir.path().join("out.csv");
        CsvReportAdapter::new().write(&output, &report).unwrap();
        let content = fs::read_to_string(&report).unwrap();
        assert_eq!(content.lines().count(), 31);
        assert!(content.lines().next().unwrap().starts_with("date,open,high,low,close"));
    }
}
