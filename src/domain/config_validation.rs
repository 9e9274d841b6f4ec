//! Configuration validation and conversion.
//!
//! Reads the `[data]`, `[indicators]`, `[volatility]` and `[rules]` sections, rejects
//! bad values before any data is read, and builds the engine config and rule set.

use crate::domain::engine::EngineConfig;
use crate::domain::error::SignalboardError;
use crate::domain::period::Period;
use crate::domain::rule::{RuleSet, ScoreRule, Side};
use crate::domain::rule_parser;
use crate::domain::volatility::VolatilityThresholds;
use crate::ports::config_port::ConfigPort;

/// Value that disables a rule in the `[rules]` section.
pub const RULE_OFF: &str = "off";

/// One `[rules]` entry: `name = buy: EXPR`, `name = sell: EXPR` or `name = off`.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleEntry {
    Define(ScoreRule),
    Disable(String),
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SignalboardError> {
    validate_data(config)?;
    build_engine_config(config)?;
    build_rule_set(config)?;
    Ok(())
}

fn validate_data(config: &dyn ConfigPort) -> Result<(), SignalboardError> {
    for key in ["dir", "symbol", "volatility_symbol"] {
        if let Some(value) = config.get_string("data", key) {
            if value.trim().is_empty() {
                return Err(invalid("data", key, "must not be empty"));
            }
        }
    }
    data_period(config)?;
    Ok(())
}

/// The `[data] period`, defaulting to six months.
pub fn data_period(config: &dyn ConfigPort) -> Result<Period, SignalboardError> {
    match config.get_string("data", "period") {
        None => Ok(Period::default()),
        Some(s) => s.parse().map_err(|e: String| invalid("data", "period", &e)),
    }
}

pub fn build_engine_config(config: &dyn ConfigPort) -> Result<EngineConfig, SignalboardError> {
    let defaults = EngineConfig::default();
    let section = "indicators";

    let engine = EngineConfig {
        rsi_window: read_window(config, section, "rsi_window", defaults.rsi_window)?,
        sma_fast: read_window(config, section, "sma_fast", defaults.sma_fast)?,
        sma_slow: read_window(config, section, "sma_slow", defaults.sma_slow)?,
        ema_span: read_window(config, section, "ema_span", defaults.ema_span)?,
        macd_fast: read_window(config, section, "macd_fast", defaults.macd_fast)?,
        macd_slow: read_window(config, section, "macd_slow", defaults.macd_slow)?,
        macd_signal: read_window(config, section, "macd_signal", defaults.macd_signal)?,
        bollinger_window: read_window(
            config,
            section,
            "bollinger_window",
            defaults.bollinger_window,
        )?,
        bollinger_num_std: read_number(
            config,
            section,
            "bollinger_std",
            defaults.bollinger_num_std,
        )?,
        stoch_window: read_window(config, section, "stoch_window", defaults.stoch_window)?,
        stoch_smooth: read_window(config, section, "stoch_smooth", defaults.stoch_smooth)?,
        volatility: build_thresholds(config)?,
        strict_windows: config.get_bool(section, "strict_windows", defaults.strict_windows),
    };

    if engine.macd_fast >= engine.macd_slow {
        return Err(invalid(section, "macd_fast", "macd_fast must be less than macd_slow"));
    }
    if engine.sma_fast > engine.sma_slow {
        return Err(invalid(section, "sma_fast", "sma_fast must not exceed sma_slow"));
    }
    if engine.bollinger_num_std < 0.0 {
        return Err(invalid(section, "bollinger_std", "bollinger_std must be non-negative"));
    }
    engine.validate()?;
    Ok(engine)
}

fn build_thresholds(config: &dyn ConfigPort) -> Result<VolatilityThresholds, SignalboardError> {
    let defaults = VolatilityThresholds::default();
    let thresholds = VolatilityThresholds {
        elevated: read_number(config, "volatility", "elevated", defaults.elevated)?,
        depressed: read_number(config, "volatility", "depressed", defaults.depressed)?,
        trend_lookback: read_window(
            config,
            "volatility",
            "trend_lookback",
            defaults.trend_lookback,
        )?,
    };
    if thresholds.depressed > thresholds.elevated {
        return Err(invalid(
            "volatility",
            "depressed",
            "depressed threshold must not exceed elevated threshold",
        ));
    }
    Ok(thresholds)
}

/// The default rule set with the `[rules]` section applied in key order.
pub fn build_rule_set(config: &dyn ConfigPort) -> Result<RuleSet, SignalboardError> {
    let mut rules = RuleSet::default_rules();
    for name in config.section_keys("rules") {
        let value = config.get_string("rules", &name).unwrap_or_default();
        match parse_rule_entry(&name, &value)? {
            RuleEntry::Define(rule) => rules.upsert(rule),
            RuleEntry::Disable(name) => rules.disable(&name)?,
        }
    }
    Ok(rules)
}

pub fn parse_rule_entry(name: &str, value: &str) -> Result<RuleEntry, SignalboardError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case(RULE_OFF) {
        return Ok(RuleEntry::Disable(name.to_string()));
    }

    let Some((side, expr)) = value.split_once(':') else {
        return Err(SignalboardError::RuleInvalid {
            reason: format!(
                "rule '{}': expected 'buy: EXPR', 'sell: EXPR' or 'off', found '{}'",
                name, value
            ),
        });
    };
    let side: Side = side.parse().map_err(|e: String| SignalboardError::RuleInvalid {
        reason: format!("rule '{}': {}", name, e),
    })?;
    let expr = expr.trim();
    let predicate = rule_parser::parse(expr).map_err(|e| SignalboardError::RuleInvalid {
        reason: format!("rule '{}':\n{}", name, e.display_with_context(expr)),
    })?;

    Ok(RuleEntry::Define(ScoreRule::new(name, side, predicate)))
}

fn read_window(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, SignalboardError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, &format!("expected an integer, found '{}'", raw)))?;
    if value < 1 {
        return Err(invalid(section, key, &format!("{} must be at least 1", key)));
    }
    usize::try_from(value).map_err(|_| invalid(section, key, "value out of range"))
}

fn read_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, SignalboardError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(section, key, &format!("expected a number, found '{}'", raw))),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> SignalboardError {
    SignalboardError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use crate::domain::rule::Predicate;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        let config = make_config(
            r#"
[data]
dir = ./data
symbol = ^GSPC
volatility_symbol = ^VIX
period = 6mo

[indicators]
rsi_window = 14
sma_fast = 50
sma_slow = 200
bollinger_std = 2.5
strict_windows = true

[volatility]
elevated = 30
depressed = 12

[rules]
rsi_oversold = buy: BELOW(rsi, 25)
stoch_overbought = off
calm_market = sell: VOL_DEPRESSED_RISING
"#,
        );
        assert!(validate_config(&config).is_ok());

        let engine = build_engine_config(&config).unwrap();
        assert_eq!(engine.sma_slow, 200);
        assert_eq!(engine.bollinger_num_std, 2.5);
        assert!(engine.strict_windows);
        assert_eq!(engine.volatility.elevated, 30.0);
        assert_eq!(engine.volatility.trend_lookback, 5);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = make_config("");
        assert_eq!(build_engine_config(&config).unwrap(), EngineConfig::default());
        assert_eq!(build_rule_set(&config).unwrap(), RuleSet::default_rules());
        assert_eq!(data_period(&config).unwrap(), Period::Months(6));
    }

    #[test]
    fn zero_window_fails() {
        let config = make_config("[indicators]\nrsi_window = 0\n");
        let err = build_engine_config(&config).unwrap_err();
        assert!(matches!(err, SignalboardError::ConfigInvalid { key, .. } if key == "rsi_window"));
    }

    #[test]
    fn non_numeric_window_fails() {
        let config = make_config("[indicators]\nsma_fast = fifty\n");
        let err = build_engine_config(&config).unwrap_err();
        assert!(matches!(err, SignalboardError::ConfigInvalid { key, .. } if key == "sma_fast"));
    }

    #[test]
    fn macd_fast_must_be_below_slow() {
        let config = make_config("[indicators]\nmacd_fast = 26\nmacd_slow = 12\n");
        let err = build_engine_config(&config).unwrap_err();
        assert!(matches!(err, SignalboardError::ConfigInvalid { key, .. } if key == "macd_fast"));
    }

    #[test]
    fn negative_bollinger_std_fails() {
        let config = make_config("[indicators]\nbollinger_std = -1\n");
        let err = build_engine_config(&config).unwrap_err();
        assert!(
            matches!(err, SignalboardError::ConfigInvalid { key, .. } if key == "bollinger_std")
        );
    }

    #[test]
    fn inverted_volatility_thresholds_fail() {
        let config = make_config("[volatility]\nelevated = 10\ndepressed = 20\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, SignalboardError::ConfigInvalid { key, .. } if key == "depressed"));
    }

    #[test]
    fn unknown_period_fails() {
        let config = make_config("[data]\nperiod = fortnight\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, SignalboardError::ConfigInvalid { key, .. } if key == "period"));
    }

    #[test]
    fn rules_override_disable_and_add() {
        let config = make_config(
            "[rules]\nrsi_oversold = buy: BELOW(rsi, 25)\nstoch_overbought = off\ncalm_market = sell: VOL_DEPRESSED_RISING\n",
        );
        let rules = build_rule_set(&config).unwrap();

        assert_eq!(
            rules.get("rsi_oversold").unwrap().predicate.to_string(),
            "BELOW(rsi, 25)"
        );
        assert!(rules.get("stoch_overbought").is_none());
        let calm = rules.get("calm_market").unwrap();
        assert_eq!(calm.side, Side::Sell);
        assert_eq!(calm.predicate, Predicate::VolatilityDepressedRising);
        assert_eq!(rules.count(Side::Buy), 7);
        assert_eq!(rules.count(Side::Sell), 6);
    }

    #[test]
    fn disabling_unknown_rule_fails() {
        let config = make_config("[rules]\nmystery = off\n");
        let err = build_rule_set(&config).unwrap_err();
        assert!(matches!(err, SignalboardError::RuleInvalid { .. }));
    }

    #[test]
    fn malformed_rule_entries_fail() {
        for value in ["BELOW(rsi, 25)", "hold: BELOW(rsi, 25)", "buy: BELOW(rsi 25)"] {
            let err = parse_rule_entry("x", value).unwrap_err();
            assert!(matches!(err, SignalboardError::RuleInvalid { .. }), "{value}");
        }
    }

    #[test]
    fn rule_entry_parses_side_case_insensitively() {
        let entry = parse_rule_entry("deep", " SELL :ABOVE(drawdown, -0.05)").unwrap();
        match entry {
            RuleEntry::Define(rule) => {
                assert_eq!(rule.side, Side::Sell);
                assert_eq!(rule.predicate.to_string(), "ABOVE(drawdown, -0.05)");
            }
            RuleEntry::Disable(_) => panic!("expected a definition"),
        }
        assert_eq!(
            parse_rule_entry("x", "OFF").unwrap(),
            RuleEntry::Disable("x".into())
        );
    }
}
