//! Predicate evaluation against one date of an indicator frame.
//!
//! # Evaluation Semantics
//!
//! - An operand that is null on the evaluated date (warm-up, missing column) makes
//!   the comparison false. Null never contributes a score point.
//! - `CROSS_ABOVE`/`CROSS_BELOW`: require `index >= 1`, return `false` at index 0
//! - `AND`: short-circuits on first `false`
//! - `OR`: short-circuits on first `true`
//! - `NOT`: false whenever any operand beneath it is null, otherwise the negation
//! - Volatility predicates read the aligned flags; no context means false

use crate::domain::frame::IndicatorFrame;
use crate::domain::rule::{Operand, Predicate};
use crate::domain::volatility::VolatilityContext;

pub fn evaluate(
    predicate: &Predicate,
    frame: &IndicatorFrame,
    volatility: Option<&VolatilityContext>,
    index: usize,
) -> bool {
    evaluate_tristate(predicate, frame, volatility, index).unwrap_or(false)
}

/// `None` when the predicate cannot be decided because an operand is null.
fn evaluate_tristate(
    predicate: &Predicate,
    frame: &IndicatorFrame,
    volatility: Option<&VolatilityContext>,
    index: usize,
) -> Option<bool> {
    match predicate {
        Predicate::Above { left, right } => {
            Some(resolve(left, frame, index)? > resolve(right, frame, index)?)
        }
        Predicate::Below { left, right } => {
            Some(resolve(left, frame, index)? < resolve(right, frame, index)?)
        }
        Predicate::CrossAbove { left, right } => {
            if index == 0 {
                return Some(false);
            }
            let left_curr = resolve(left, frame, index)?;
            let right_curr = resolve(right, frame, index)?;
            let left_prev = resolve(left, frame, index - 1)?;
            let right_prev = resolve(right, frame, index - 1)?;
            Some(left_curr > right_curr && left_prev <= right_prev)
        }
        Predicate::CrossBelow { left, right } => {
            if index == 0 {
                return Some(false);
            }
            let left_curr = resolve(left, frame, index)?;
            let right_curr = resolve(right, frame, index)?;
            let left_prev = resolve(left, frame, index - 1)?;
            let right_prev = resolve(right, frame, index - 1)?;
            Some(left_curr < right_curr && left_prev >= right_prev)
        }
        Predicate::Between {
            operand,
            lower,
            upper,
        } => {
            let val = resolve(operand, frame, index)?;
            Some(val >= *lower && val <= *upper)
        }
        Predicate::And(items) => {
            let mut undecided = false;
            for item in items {
                match evaluate_tristate(item, frame, volatility, index) {
                    Some(false) => return Some(false),
                    Some(true) => {}
                    None => undecided = true,
                }
            }
            if undecided { None } else { Some(true) }
        }
        Predicate::Or(items) => {
            let mut undecided = false;
            for item in items {
                match evaluate_tristate(item, frame, volatility, index) {
                    Some(true) => return Some(true),
                    Some(false) => {}
                    None => undecided = true,
                }
            }
            if undecided { None } else { Some(false) }
        }
        Predicate::Not(inner) => evaluate_tristate(inner, frame, volatility, index).map(|v| !v),
        Predicate::VolatilityElevatedFalling => {
            Some(volatility.is_some_and(|v| v.flags_at(index).elevated_and_falling))
        }
        Predicate::VolatilityDepressedRising => {
            Some(volatility.is_some_and(|v| v.flags_at(index).depressed_or_rising))
        }
    }
}

fn resolve(operand: &Operand, frame: &IndicatorFrame, index: usize) -> Option<f64> {
    let bar = frame.bars.get(index)?;
    let value = match operand {
        Operand::Open => bar.open,
        Operand::High => bar.high,
        Operand::Low => bar.low,
        Operand::Close => bar.close,
        Operand::Price => bar.price(),
        Operand::Volume => bar.volume,
        Operand::Constant(v) => *v,
        Operand::Column(column) => frame.value(*column, index)?,
    };
    (!value.is_nan()).then_some(value)
}
