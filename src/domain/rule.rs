//! Scoring rule AST and rule sets.
//!
//! - `Operand`: what can be compared (price fields, constants, frame columns)
//! - `Predicate`: boolean test over one date's frame row and volatility flags
//! - `ScoreRule`: a named predicate tagged buy or sell
//! - `RuleSet`: the configured collection; the default mirrors the reference dashboards

use std::fmt;
use std::str::FromStr;

use crate::domain::error::SignalboardError;
use crate::domain::frame::Column;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Open,
    High,
    Low,
    Close,
    /// Adjusted close, falling back to close.
    Price,
    Volume,
    Constant(f64),
    Column(Column),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Above { left: Operand, right: Operand },
    Below { left: Operand, right: Operand },
    CrossAbove { left: Operand, right: Operand },
    CrossBelow { left: Operand, right: Operand },
    Between { operand: Operand, lower: f64, upper: f64 },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    VolatilityElevatedFalling,
    VolatilityDepressedRising,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRule {
    pub name: String,
    pub side: Side,
    pub predicate: Predicate,
}

impl ScoreRule {
    pub fn new(name: impl Into<String>, side: Side, predicate: Predicate) -> Self {
        Self {
            name: name.into(),
            side,
            predicate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSet {
    rules: Vec<ScoreRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ScoreRule>) -> Self {
        Self { rules }
    }

    /// The rule table used by the reference dashboards: seven buy rules, six sell rules.
    pub fn default_rules() -> Self {
        use Operand::{Column as Col, Constant, Price};

        let cmp_above = |left, right| Predicate::Above { left, right };
        let cmp_below = |left, right| Predicate::Below { left, right };

        Self::new(vec![
            ScoreRule::new("rsi_oversold", Side::Buy, cmp_below(Col(Column::Rsi), Constant(30.0))),
            ScoreRule::new(
                "deep_drawdown",
                Side::Buy,
                cmp_below(Col(Column::Drawdown), Constant(-0.10)),
            ),
            ScoreRule::new(
                "macd_bullish",
                Side::Buy,
                cmp_above(Col(Column::Macd), Col(Column::MacdSignal)),
            ),
            ScoreRule::new(
                "trend_up",
                Side::Buy,
                cmp_above(Col(Column::SmaFast), Col(Column::SmaSlow)),
            ),
            ScoreRule::new(
                "below_lower_band",
                Side::Buy,
                cmp_below(Price, Col(Column::BbLower)),
            ),
            ScoreRule::new(
                "stoch_oversold",
                Side::Buy,
                cmp_below(Col(Column::StochK), Constant(20.0)),
            ),
            ScoreRule::new(
                "volatility_capitulation",
                Side::Buy,
                Predicate::VolatilityElevatedFalling,
            ),
            ScoreRule::new(
                "rsi_overbought",
                Side::Sell,
                cmp_above(Col(Column::Rsi), Constant(70.0)),
            ),
            ScoreRule::new(
                "near_high",
                Side::Sell,
                cmp_above(Col(Column::Drawdown), Constant(-0.01)),
            ),
            ScoreRule::new(
                "macd_bearish",
                Side::Sell,
                cmp_below(Col(Column::Macd), Col(Column::MacdSignal)),
            ),
            ScoreRule::new(
                "trend_down",
                Side::Sell,
                cmp_below(Col(Column::SmaFast), Col(Column::SmaSlow)),
            ),
            ScoreRule::new(
                "above_upper_band",
                Side::Sell,
                cmp_above(Price, Col(Column::BbUpper)),
            ),
            ScoreRule::new(
                "stoch_overbought",
                Side::Sell,
                cmp_above(Col(Column::StochK), Constant(80.0)),
            ),
        ])
    }

    pub fn rules(&self) -> &[ScoreRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ScoreRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Number of rules contributing to `side`; the upper bound for that score.
    pub fn count(&self, side: Side) -> usize {
        self.rules.iter().filter(|r| r.side == side).count()
    }

    /// Replaces the rule with the same name in place, or appends it.
    pub fn upsert(&mut self, rule: ScoreRule) {
        match self.rules.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn disable(&mut self, name: &str) -> Result<(), SignalboardError> {
        let before = self.rules.len();
        self.rules.retain(|r| r.name != name);
        if self.rules.len() == before {
            return Err(SignalboardError::RuleInvalid {
                reason: format!("cannot disable unknown rule '{}'", name),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.pad("buy"),
            Side::Sell => f.pad("sell"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(format!("expected 'buy' or 'sell', found '{}'", other)),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Open => f.write_str("open"),
            Operand::High => f.write_str("high"),
            Operand::Low => f.write_str("low"),
            Operand::Close => f.write_str("close"),
            Operand::Price => f.write_str("price"),
            Operand::Volume => f.write_str("volume"),
            Operand::Constant(v) => write!(f, "{}", v),
            Operand::Column(c) => write!(f, "{}", c),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, keyword: &str, items: &[Predicate]) -> fmt::Result {
    write!(f, "{}(", keyword)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str(")")
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Above { left, right } => write!(f, "ABOVE({}, {})", left, right),
            Predicate::Below { left, right } => write!(f, "BELOW({}, {})", left, right),
            Predicate::CrossAbove { left, right } => write!(f, "CROSS_ABOVE({}, {})", left, right),
            Predicate::CrossBelow { left, right } => write!(f, "CROSS_BELOW({}, {})", left, right),
            Predicate::Between {
                operand,
                lower,
                upper,
            } => write!(f, "BETWEEN({}, {}, {})", operand, lower, upper),
            Predicate::And(items) => write_list(f, "AND", items),
            Predicate::Or(items) => write_list(f, "OR", items),
            Predicate::Not(inner) => write!(f, "NOT({})", inner),
            Predicate::VolatilityElevatedFalling => f.write_str("VOL_ELEVATED_FALLING"),
            Predicate::VolatilityDepressedRising => f.write_str("VOL_DEPRESSED_RISING"),
        }
    }
}
