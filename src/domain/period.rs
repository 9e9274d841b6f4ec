//! Look-back periods applied to a price history ("5d", "6mo", "1y", "ytd", "max").

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Days(u32),
    Months(u32),
    Years(u32),
    /// From January 1st of the latest bar's year.
    Ytd,
    /// The whole history.
    Max,
}

impl Default for Period {
    fn default() -> Self {
        Period::Months(6)
    }
}

impl Period {
    /// First date kept when the latest bar is dated `last`; `None` keeps everything.
    ///
    /// The window covers `last` and the preceding span, so "5d" ending on a Friday
    /// starts on the Monday.
    pub fn start_from(self, last: NaiveDate) -> Option<NaiveDate> {
        let cutoff = match self {
            Period::Max => return None,
            Period::Ytd => return NaiveDate::from_ymd_opt(last.year(), 1, 1),
            Period::Days(n) => last.checked_sub_days(Days::new(u64::from(n))),
            Period::Months(n) => last.checked_sub_months(Months::new(n)),
            Period::Years(n) => n
                .checked_mul(12)
                .and_then(|months| last.checked_sub_months(Months::new(months))),
        };
        // Past the calendar's range means the period reaches back before any data.
        cutoff.and_then(|d| d.succ_opt())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{}d", n),
            Period::Months(n) => write!(f, "{}mo", n),
            Period::Years(n) => write!(f, "{}y", n),
            Period::Ytd => f.write_str("ytd"),
            Period::Max => f.write_str("max"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_lowercase();
        match text.as_str() {
            "ytd" => return Ok(Period::Ytd),
            "max" => return Ok(Period::Max),
            _ => {}
        }

        let digits_end = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let (digits, unit) = text.split_at(digits_end);
        let invalid = || format!("invalid period '{}' (expected e.g. 5d, 6mo, 1y, ytd, max)", s);
        let n: u32 = digits.parse().map_err(|_| invalid())?;
        if n == 0 {
            return Err(invalid());
        }
        match unit {
            "d" => Ok(Period::Days(n)),
            "mo" => Ok(Period::Months(n)),
            "y" => Ok(Period::Years(n)),
            _ => Err(invalid()),
        }
    }
}
