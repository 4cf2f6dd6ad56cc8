//! Statistical building blocks shared by the metrics in [`crate::metric`] and by the walk-forward
//! overfitting detector in the orchestration layer above this crate.

use tradecore_decimal::Decimal;

/// Arithmetic mean. `Decimal::NAN` on an empty slice.
pub fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::NAN;
    }
    let sum = values.iter().fold(Decimal::ZERO, |acc, v| acc + *v);
    sum.checked_div(Decimal::from_i64(values.len() as i64))
        .unwrap_or(Decimal::NAN)
}

/// Population standard deviation (divides by `n`, not `n - 1`), matching the convention used by
/// the Sharpe/Sortino calculators which treat a return series as the full population under study
/// rather than a sample of a larger one.
pub fn population_std_dev(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::NAN;
    }
    let mean = mean(values);
    let sum_sq_diff = values.iter().fold(Decimal::ZERO, |acc, v| {
        let diff = *v - mean;
        acc + diff.checked_mul(diff).unwrap_or(Decimal::NAN)
    });
    let variance = sum_sq_diff
        .checked_div(Decimal::from_i64(values.len() as i64))
        .unwrap_or(Decimal::NAN);
    variance.sqrt()
}

/// Downside deviation: population standard deviation of the subset of `values` below
/// `target`, used by [`crate::metric::sortino::SortinoRatio`]. Zero (not `NaN`) when no value
/// falls below the target, since "no downside observed" is a well-defined zero-risk outcome.
pub fn downside_deviation(values: &[Decimal], target: Decimal) -> Decimal {
    let downside: Vec<Decimal> = values.iter().copied().filter(|v| *v < target).collect();
    if downside.is_empty() {
        return Decimal::ZERO;
    }
    let sum_sq = downside.iter().fold(Decimal::ZERO, |acc, v| {
        let diff = *v - target;
        acc + diff.checked_mul(diff).unwrap_or(Decimal::NAN)
    });
    let variance = sum_sq
        .checked_div(Decimal::from_i64(downside.len() as i64))
        .unwrap_or(Decimal::NAN);
    variance.sqrt()
}

/// Pearson correlation coefficient between two equal-length series. `Decimal::NAN` if the
/// lengths differ, fewer than two points are given, or either series has zero variance.
pub fn pearson_correlation(xs: &[Decimal], ys: &[Decimal]) -> Decimal {
    if xs.len() != ys.len() || xs.len() < 2 {
        return Decimal::NAN;
    }
    let mean_x = mean(xs);
    let mean_y = mean(ys);

    let mut cov = Decimal::ZERO;
    let mut var_x = Decimal::ZERO;
    let mut var_y = Decimal::ZERO;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = *x - mean_x;
        let dy = *y - mean_y;
        cov = cov + dx.checked_mul(dy).unwrap_or(Decimal::NAN);
        var_x = var_x + dx.checked_mul(dx).unwrap_or(Decimal::NAN);
        var_y = var_y + dy.checked_mul(dy).unwrap_or(Decimal::NAN);
    }

    let denom = var_x.checked_mul(var_y).unwrap_or(Decimal::NAN).sqrt();
    cov.checked_div(denom).unwrap_or(Decimal::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<Decimal> {
        values.iter().map(|v| Decimal::from_f64(*v)).collect()
    }

    #[test]
    fn mean_of_empty_is_nan() {
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn mean_of_simple_series() {
        let values = series(&[1.0, 2.0, 3.0]);
        assert_eq!(mean(&values), Decimal::from_f64(2.0));
    }

    #[test]
    fn population_std_dev_of_constant_series_is_zero() {
        let values = series(&[5.0, 5.0, 5.0]);
        assert_eq!(population_std_dev(&values), Decimal::ZERO);
    }

    #[test]
    fn downside_deviation_ignores_values_at_or_above_target() {
        let values = series(&[-1.0, 0.0, 1.0, 2.0]);
        let dd = downside_deviation(&values, Decimal::ZERO);
        assert_eq!(dd, Decimal::from_f64(1.0));
    }

    #[test]
    fn pearson_correlation_perfect_positive() {
        let xs = series(&[1.0, 2.0, 3.0, 4.0]);
        let ys = series(&[2.0, 4.0, 6.0, 8.0]);
        let corr = pearson_correlation(&xs, &ys);
        assert!((corr.to_f64() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_correlation_requires_matching_lengths() {
        let xs = series(&[1.0, 2.0]);
        let ys = series(&[1.0]);
        assert!(pearson_correlation(&xs, &ys).is_nan());
    }
}
