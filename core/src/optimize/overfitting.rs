//! Heuristic detector for walk-forward overfitting: combines the train/test performance gap,
//! the variance of test-window performance, and the sensitivity of training performance to the
//! parameter set into a single probability estimate.

use tradecore_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverfittingConfig {
    pub gap_threshold: Decimal,
    pub cv_threshold: Decimal,
    pub gap_weight: Decimal,
    pub cv_weight: Decimal,
    pub sensitivity_weight: Decimal,
    pub probability_threshold: Decimal,
}

impl Default for OverfittingConfig {
    fn default() -> Self {
        Self {
            gap_threshold: Decimal::from_f64(0.5),
            cv_threshold: Decimal::from_f64(0.5),
            gap_weight: Decimal::from_f64(0.4),
            cv_weight: Decimal::from_f64(0.3),
            sensitivity_weight: Decimal::from_f64(0.3),
            probability_threshold: Decimal::from_f64(0.7),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Recommendation {
    InsufficientData,
    Reject,
    Caution,
    Proceed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverfittingReport {
    pub train_test_gap: Decimal,
    pub test_performance_cv: Decimal,
    pub param_sensitivity: Decimal,
    pub stability: Decimal,
    pub overfitting_probability: Decimal,
    pub is_likely_overfitting: bool,
    pub recommendation: Recommendation,
}

pub struct OverfittingDetector {
    config: OverfittingConfig,
}

impl OverfittingDetector {
    pub fn new(config: OverfittingConfig) -> Self {
        Self { config }
    }

    /// Scores a completed walk-forward run from its per-window train/test Sharpe ratios. Fewer
    /// than three windows is treated as not enough evidence to judge either way.
    pub fn analyze(&self, train_sharpe: &[Decimal], test_sharpe: &[Decimal]) -> OverfittingReport {
        if train_sharpe.len() < 3 || train_sharpe.len() != test_sharpe.len() {
            return OverfittingReport {
                train_test_gap: Decimal::ZERO,
                test_performance_cv: Decimal::ZERO,
                param_sensitivity: Decimal::ZERO,
                stability: Decimal::ZERO,
                overfitting_probability: Decimal::ZERO,
                is_likely_overfitting: false,
                recommendation: Recommendation::InsufficientData,
            };
        }

        let gap = mean_abs_diff(train_sharpe, test_sharpe);
        let cv = coefficient_of_variation(test_sharpe);
        let sensitivity = param_sensitivity(train_sharpe);
        let stability = self.stability(gap, cv, sensitivity);
        let probability = self.probability(gap, cv, sensitivity);
        let is_likely_overfitting = probability > self.config.probability_threshold;

        let recommendation = if probability > Decimal::from_f64(0.8) || stability < Decimal::from_f64(0.3) {
            Recommendation::Reject
        } else if probability > Decimal::from_f64(0.5) || stability < Decimal::from_f64(0.5) {
            Recommendation::Caution
        } else {
            Recommendation::Proceed
        };

        OverfittingReport {
            train_test_gap: gap,
            test_performance_cv: cv,
            param_sensitivity: sensitivity,
            stability,
            overfitting_probability: probability,
            is_likely_overfitting,
            recommendation,
        }
    }

    fn stability(&self, gap: Decimal, cv: Decimal, sensitivity: Decimal) -> Decimal {
        let one = Decimal::ONE;
        let term_gap = clamp01(one - clamp01(gap));
        let term_cv = clamp01(one - clamp01(cv));
        let term_sensitivity = clamp01(one - clamp01(sensitivity));
        clamp01(
            Decimal::from_f64(0.4) * term_gap
                + Decimal::from_f64(0.3) * term_cv
                + Decimal::from_f64(0.3) * term_sensitivity,
        )
    }

    fn probability(&self, gap: Decimal, cv: Decimal, sensitivity: Decimal) -> Decimal {
        let gap_term = clamp01(gap.checked_div(self.config.gap_threshold).unwrap_or(Decimal::ZERO));
        let cv_term = clamp01(cv.checked_div(self.config.cv_threshold).unwrap_or(Decimal::ZERO));
        clamp01(
            self.config.gap_weight * gap_term
                + self.config.cv_weight * cv_term
                + self.config.sensitivity_weight * clamp01(sensitivity),
        )
    }
}

fn clamp01(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(Decimal::ONE)
}

fn mean_abs_diff(a: &[Decimal], b: &[Decimal]) -> Decimal {
    let diffs: Vec<Decimal> = a.iter().zip(b.iter()).map(|(x, y)| (*x - *y).abs()).collect();
    tradecore_analytics::algorithm::mean(&diffs)
}

/// Test-window coefficient of variation, clamped to `[0, 2]`. Falls back to `min(1, std)` when
/// the mean is near zero, since dividing by a near-zero mean blows the ratio up meaninglessly.
fn coefficient_of_variation(values: &[Decimal]) -> Decimal {
    let mean = tradecore_analytics::algorithm::mean(values);
    let std = tradecore_analytics::algorithm::population_std_dev(values);
    let epsilon = Decimal::from_f64(1e-6);
    if mean.abs() < epsilon {
        return std.min(Decimal::ONE);
    }
    (std.checked_div(mean.abs()).unwrap_or(Decimal::ZERO)).max(Decimal::ZERO).min(Decimal::from_i64(2))
}

/// How much training performance swings across the windows, as a fraction of a 2.0 Sharpe spread.
fn param_sensitivity(train_sharpe: &[Decimal]) -> Decimal {
    let max = train_sharpe.iter().copied().fold(Decimal::MIN, |a, b| if b > a { b } else { a });
    let min = train_sharpe.iter().copied().fold(Decimal::MAX, |a, b| if b < a { b } else { a });
    ((max - min).checked_div(Decimal::from_i64(2)).unwrap_or(Decimal::ZERO)).max(Decimal::ZERO).min(Decimal::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fewer_than_three_windows_is_insufficient_data() {
        let detector = OverfittingDetector::new(OverfittingConfig::default());
        let report = detector.analyze(&[Decimal::ONE, Decimal::ONE], &[Decimal::ONE, Decimal::ONE]);
        assert_eq!(report.recommendation, Recommendation::InsufficientData);
    }

    #[test]
    fn identical_train_and_test_sharpe_is_stable_and_proceeds() {
        let detector = OverfittingDetector::new(OverfittingConfig::default());
        let sharpe = vec![Decimal::from_f64(1.0), Decimal::from_f64(1.0), Decimal::from_f64(1.0), Decimal::from_f64(1.0)];
        let report = detector.analyze(&sharpe, &sharpe);
        assert_eq!(report.train_test_gap, Decimal::ZERO);
        assert_eq!(report.recommendation, Recommendation::Proceed);
        assert!(!report.is_likely_overfitting);
    }

    #[test]
    fn large_train_test_gap_is_rejected() {
        let detector = OverfittingDetector::new(OverfittingConfig::default());
        let train = vec![Decimal::from_f64(3.0), Decimal::from_f64(3.0), Decimal::from_f64(3.0), Decimal::from_f64(3.0)];
        let test = vec![Decimal::from_f64(0.0), Decimal::from_f64(0.1), Decimal::from_f64(-0.2), Decimal::from_f64(0.05)];
        let report = detector.analyze(&train, &test);
        assert!(report.overfitting_probability > Decimal::from_f64(0.5));
        assert!(matches!(report.recommendation, Recommendation::Reject | Recommendation::Caution));
    }
}
