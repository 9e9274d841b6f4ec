//! Buy/sell score aggregation.

use chrono::NaiveDate;

use crate::domain::error::InvalidInputError;
use crate::domain::frame::IndicatorFrame;
use crate::domain::rule::{RuleSet, Side};
use crate::domain::rule_eval::evaluate;
use crate::domain::volatility::VolatilityContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRow {
    pub date: NaiveDate,
    pub buy_score: u32,
    pub sell_score: u32,
}

impl ScoreRow {
    pub fn net(&self) -> i64 {
        i64::from(self.buy_score) - i64::from(self.sell_score)
    }
}

/// Counts the true rules per side on every date of `frame`.
///
/// The volatility context, when given, must be aligned to the frame's dates.
pub fn compute_scores(
    frame: &IndicatorFrame,
    volatility: Option<&VolatilityContext>,
    rules: &RuleSet,
) -> Result<Vec<ScoreRow>, InvalidInputError> {
    if let Some(ctx) = volatility {
        if ctx.len() != frame.len() {
            return Err(InvalidInputError::new(format!(
                "scores: volatility context has {} rows, frame has {}",
                ctx.len(),
                frame.len()
            )));
        }
    }

    Ok(frame
        .bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let mut row = ScoreRow {
                date: bar.date,
                buy_score: 0,
                sell_score: 0,
            };
            for rule in rules.rules() {
                if !evaluate(&rule.predicate, frame, volatility, i) {
                    continue;
                }
                match rule.side {
                    Side::Buy => row.buy_score += 1,
                    Side::Sell => row.sell_score += 1,
                }
            }
            row
        })
        .collect())
}
