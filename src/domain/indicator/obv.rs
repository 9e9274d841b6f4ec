//! OBV (On-Balance Volume) indicator.

use crate::domain::error::InvalidInputError;
use crate::domain::indicator::{ensure_non_empty, ensure_same_len};

/// Calculate OBV (On-Balance Volume).
///
/// OBV[0] = 0
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warmup period; every position is defined.
pub fn compute_obv(close: &[f64], volume: &[f64]) -> Result<Vec<f64>, InvalidInputError> {
    ensure_non_empty(close, "obv")?;
    ensure_same_len(&[("close", close.len()), ("volume", volume.len())], "obv")?;
    if let Some((i, v)) = volume.iter().enumerate().find(|(_, v)| !(**v >= 0.0)) {
        return Err(InvalidInputError::new(format!(
            "obv: volume at index {i} must be non-negative, got {v}"
        )));
    }

    let mut values = Vec::with_capacity(close.len());
    let mut obv = 0.0;
    values.push(obv);

    for i in 1..close.len() {
        if close[i] > close[i - 1] {
            obv += volume[i];
        } else if close[i] < close[i - 1] {
            obv -= volume[i];
        }
        values.push(obv);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obv_known_sequence() {
        let obv = compute_obv(&[10.0, 11.0, 10.0, 10.0, 12.0], &[100.0; 5]).unwrap();
        assert_eq!(obv, vec![0.0, 100.0, 0.0, 0.0, 100.0]);
    }

    #[test]
    fn obv_first_value_is_zero() {
        let obv = compute_obv(&[100.0], &[5000.0]).unwrap();
        assert_eq!(obv, vec![0.0]);
    }

    #[test]
    fn obv_adds_volume_on_up_day() {
        let obv = compute_obv(&[100.0, 105.0], &[1000.0, 500.0]).unwrap();
        assert_eq!(obv[1], 500.0);
    }

    #[test]
    fn obv_subtracts_volume_on_down_day() {
        let obv = compute_obv(&[100.0, 95.0], &[1000.0, 300.0]).unwrap();
        assert_eq!(obv[1], -300.0);
    }

    #[test]
    fn obv_unchanged_on_flat_day() {
        let obv = compute_obv(&[100.0, 105.0, 105.0], &[1.0, 2.0, 700.0]).unwrap();
        assert_eq!(obv[2], obv[1]);
    }

    #[test]
    fn obv_rejects_bad_input() {
        assert!(compute_obv(&[], &[]).is_err());
        assert!(compute_obv(&[1.0, 2.0], &[1.0]).is_err());
        assert!(compute_obv(&[1.0, 2.0], &[1.0, -1.0]).is_err());
    }
}
