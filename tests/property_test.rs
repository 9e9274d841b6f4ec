//! Property tests for indicator and score invariants over generated price paths.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use signalboard::domain::engine::{run, EngineConfig};
use signalboard::domain::indicator::{
    bullish_crossovers, compute_bollinger_bands, compute_drawdown, compute_macd, compute_obv,
    compute_rsi, compute_stochastic,
};
use signalboard::domain::ohlcv::{OhlcvBar, PriceSeries};
use signalboard::domain::rule::{RuleSet, Side};

fn prices() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..10_000.0, 1..120)
}

fn series_from(closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &p)| OhlcvBar::from_price(start + Days::new(i as u64), p))
        .collect();
    PriceSeries::new("^GSPC", bars).unwrap()
}

proptest! {
    #[test]
    fn drawdown_never_positive(prices in prices()) {
        let dd = compute_drawdown(&prices).unwrap();
        prop_assert_eq!(dd.len(), prices.len());

        let mut peak = f64::MIN;
        for (p, d) in prices.iter().zip(&dd) {
            prop_assert!(*d <= 0.0);
            prop_assert!(*d > -1.0);
            if *p >= peak {
                peak = *p;
                prop_assert_eq!(*d, 0.0);
            }
        }
    }

    #[test]
    fn rsi_is_bounded(prices in prices(), window in 1usize..30) {
        let rsi = compute_rsi(&prices, window).unwrap();
        prop_assert_eq!(rsi.len(), prices.len());
        for (i, v) in rsi.iter().enumerate() {
            match v {
                Some(v) => {
                    prop_assert!(i >= window);
                    prop_assert!((0.0..=100.0).contains(v));
                }
                None => prop_assert!(i < window || prices.len() < window + 1),
            }
        }
    }

    #[test]
    fn obv_ignores_price_level(
        closes in prop::collection::vec(1i32..500, 1..80),
        shift in 0i32..1000,
        volume in 0.0f64..1e6,
    ) {
        let base: Vec<f64> = closes.iter().map(|&c| f64::from(c)).collect();
        let shifted: Vec<f64> = closes.iter().map(|&c| f64::from(c + shift)).collect();
        let volumes = vec![volume; base.len()];

        let a = compute_obv(&base, &volumes).unwrap();
        let b = compute_obv(&shifted, &volumes).unwrap();
        prop_assert_eq!(a[0], 0.0);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn crossovers_never_fire_twice_in_a_row(prices in prices()) {
        let macd = compute_macd(&prices, 3, 6, 3).unwrap();
        let flags = bullish_crossovers(&macd.line, &macd.signal);
        prop_assert_eq!(flags.len(), prices.len());
        prop_assert!(!flags.first().copied().unwrap_or(false));
        for pair in flags.windows(2) {
            prop_assert!(!(pair[0] && pair[1]));
        }
    }

    #[test]
    fn bollinger_bands_are_ordered(
        prices in prices(),
        window in 1usize..25,
        num_std in 0.0f64..4.0,
    ) {
        let bands = compute_bollinger_bands(&prices, window, num_std).unwrap();
        for i in 0..prices.len() {
            match (bands.upper[i], bands.middle[i], bands.lower[i]) {
                (Some(u), Some(m), Some(l)) => {
                    prop_assert!(u >= m);
                    prop_assert!(m >= l);
                }
                (None, None, None) => prop_assert!(i + 1 < window),
                other => prop_assert!(false, "bands disagree at {}: {:?}", i, other),
            }
        }
    }

    #[test]
    fn stochastic_is_bounded(prices in prices(), window in 1usize..20, smooth in 1usize..4) {
        let highs: Vec<f64> = prices.iter().map(|p| p * 1.01).collect();
        let lows: Vec<f64> = prices.iter().map(|p| p * 0.99).collect();
        let stoch = compute_stochastic(&highs, &lows, &prices, window, smooth).unwrap();
        for v in stoch.k.iter().chain(&stoch.d).flatten() {
            prop_assert!(*v >= -1e-9 && *v <= 100.0 + 1e-9);
        }
    }

    #[test]
    fn scores_stay_within_rule_counts(
        closes in prop::collection::vec(10.0f64..500.0, 1..90),
        vix in prop::collection::vec(9.0f64..80.0, 1..90),
    ) {
        let series = series_from(&closes);
        let volatility = series_from(&vix);
        let rules = RuleSet::default_rules();
        let config = EngineConfig {
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
        };

        let output = run(&series, Some(&volatility), &config, &rules).unwrap();
        prop_assert_eq!(output.scores.len(), closes.len());
        for (row, bar) in output.scores.iter().zip(series.bars()) {
            prop_assert_eq!(row.date, bar.date);
            prop_assert!(row.buy_score as usize <= rules.count(Side::Buy));
            prop_assert!(row.sell_score as usize <= rules.count(Side::Sell));
        }
    }
}
