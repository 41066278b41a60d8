//! Statistics calculation engine.
//!
//! Decimal aggregate helpers shared by the ledger projection, and the
//! per-stat ranking calculators in [`rankings`].

pub mod rankings;

pub use rankings::*;

use rust_decimal::{Decimal, MathematicalOps};

/// Sum of all values. `None` for an empty slice, like SQL `SUM`, and on overflow.
pub fn sum(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
}

/// Largest value.
pub fn max(values: &[Decimal]) -> Option<Decimal> {
    values.iter().copied().max()
}

/// Arithmetic mean.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    let total = sum(values)?;
    total.checked_div(Decimal::from(values.len()))
}

/// Sample standard deviation (n - 1 denominator).
///
/// Needs at least two values. `None` when the squared deviations do not
/// fit in a `Decimal`.
pub fn sample_std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }

    let avg = mean(values)?;
    let squared = values.iter().try_fold(Decimal::ZERO, |acc, v| {
        let diff = v.checked_sub(avg)?;
        acc.checked_add(diff.checked_mul(diff)?)
    })?;
    let variance = squared.checked_div(Decimal::from(values.len() - 1))?;

    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimals(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|v| Decimal::from(*v)).collect()
    }

    #[test]
    fn test_sum() {
        assert_eq!(sum(&decimals(&[50, -20, 10])), Some(Decimal::from(40)));
        assert_eq!(sum(&[]), None);
    }

    #[test]
    fn test_sum_of_zeroes_is_not_missing() {
        assert_eq!(sum(&decimals(&[0, 0])), Some(Decimal::ZERO));
    }

    #[test]
    fn test_max() {
        assert_eq!(max(&decimals(&[-5, 30, 12])), Some(Decimal::from(30)));
        assert_eq!(max(&[]), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&decimals(&[10, 20, 30])), Some(Decimal::from(20)));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_sample_std_dev() {
        // Sample variance of 2, 4, 4, 4, 5, 5, 7, 9 is 32 / 7
        let sd = sample_std_dev(&decimals(&[2, 4, 4, 4, 5, 5, 7, 9])).unwrap();
        let expected = Decimal::new(2138, 3); // sqrt(4.571...) ~ 2.138
        assert!((sd - expected).abs() < Decimal::new(1, 3));
    }

    #[test]
    fn test_sample_std_dev_constant_values() {
        assert_eq!(
            sample_std_dev(&decimals(&[25, 25, 25])),
            Some(Decimal::ZERO)
        );
    }

    #[test]
    fn test_overflow_is_missing_not_a_panic() {
        assert_eq!(sum(&[Decimal::MAX, Decimal::ONE]), None);
        assert_eq!(mean(&[Decimal::MAX, Decimal::MAX]), None);

        // Deviations around 6.7e14 square past Decimal::MAX
        let big = 1_000_000_000_000_000;
        let spread = decimals(&[big, -big, big]);
        assert_eq!(sample_std_dev(&spread), None);
        assert_eq!(sum(&spread), Some(Decimal::from(big)));
    }

    #[test]
    fn test_sample_std_dev_needs_two_values() {
        assert_eq!(sample_std_dev(&decimals(&[100])), None);
        assert_eq!(sample_std_dev(&[]), None);
    }
}
