//! Walk-forward analysis: slice a candle series into train/test windows, grid-search each
//! training slice, score the winner out-of-sample on the paired test slice, then feed the
//! train/test Sharpe pairs to the overfitting detector.

use tradecore_decimal::Decimal;
use tradecore_markets::Candle;
use tradecore_trader::{ParameterSet, Strategy};

use crate::backtest::{BacktestConfig, BacktestEngine, BacktestResult};
use crate::optimize::grid::{GridSearchOptimizer, Objective, OptimizationConfig};
use crate::optimize::overfitting::{OverfittingConfig, OverfittingDetector, OverfittingReport};
use crate::optimize::split::{slice, DataSplitter, SplitConfig, SplitError, Window};

#[derive(Debug, Clone, PartialEq)]
pub struct WindowResult {
    pub window: Window,
    pub params: ParameterSet,
    pub train_sharpe: Decimal,
    pub test_sharpe: Decimal,
    pub train_result: BacktestResult,
    pub test_result: BacktestResult,
    pub overfitting_score: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverallStats {
    pub mean_train_sharpe: Decimal,
    pub mean_test_sharpe: Decimal,
    pub mean_train_return: Decimal,
    pub mean_test_return: Decimal,
    pub consistency_score: Decimal,
    pub train_test_correlation: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkForwardReport {
    pub windows: Vec<WindowResult>,
    pub overall: OverallStats,
    pub overfitting: OverfittingReport,
    pub best_overall_params: Option<ParameterSet>,
}

pub struct WalkForwardAnalyzer;

impl WalkForwardAnalyzer {
    /// Runs one train/test cycle per window that `DataSplitter::split` produces over `candles`,
    /// scoring every cycle with `objective` and optimizing over `parameters`.
    pub fn run<S: Strategy>(
        candles: &[Candle],
        base_config: &BacktestConfig,
        parameters: Vec<tradecore_trader::StrategyParameter>,
        objective: Objective,
        split_config: &SplitConfig,
    ) -> Result<WalkForwardReport, SplitError> {
        let windows = DataSplitter::split(candles.len(), split_config)?;
        let mut results = Vec::with_capacity(windows.len());

        for window in &windows {
            let train_candles = slice(candles, window.train_start, window.train_end);
            let test_candles = slice(candles, window.test_start, window.test_end);

            let train_config = window_config(base_config, train_candles);
            let opt_config = OptimizationConfig {
                objective: objective.clone(),
                backtest_config: train_config.clone(),
                parameters: parameters.clone(),
                max_combinations: None,
                enable_parallel: true,
            };
            let report = GridSearchOptimizer::run::<S>(train_candles, opt_config)
                .expect("parameter set was already validated by the caller");
            let params = report.best_params.clone().unwrap_or_else(ParameterSet::new);

            let train_result =
                BacktestEngine::new().run::<S>(&params, train_candles, train_config, None, None);
            let test_config = window_config(base_config, test_candles);
            let test_result = BacktestEngine::new().run::<S>(&params, test_candles, test_config, None, None);

            let train_sharpe = objective.score(&train_result);
            let test_sharpe = objective.score(&test_result);
            let overfitting_score = if train_sharpe > Decimal::ZERO {
                ((train_sharpe - test_sharpe).checked_div(train_sharpe).unwrap_or(Decimal::ZERO))
                    .max(Decimal::ZERO)
            } else {
                Decimal::ZERO
            };

            results.push(WindowResult {
                window: *window,
                params,
                train_sharpe,
                test_sharpe,
                train_result,
                test_result,
                overfitting_score,
            });
        }

        let overall = aggregate(&results);
        let train_sharpe: Vec<Decimal> = results.iter().map(|w| w.train_sharpe).collect();
        let test_sharpe: Vec<Decimal> = results.iter().map(|w| w.test_sharpe).collect();
        let overfitting = OverfittingDetector::new(OverfittingConfig::default()).analyze(&train_sharpe, &test_sharpe);

        let best_overall_params = results
            .iter()
            .max_by(|a, b| {
                let score_a = a.test_sharpe * (Decimal::ONE - a.overfitting_score);
                let score_b = b.test_sharpe * (Decimal::ONE - b.overfitting_score);
                score_a.cmp_total(&score_b)
            })
            .map(|w| w.params.clone());

        Ok(WalkForwardReport { windows: results, overall, overfitting, best_overall_params })
    }
}

fn window_config(base: &BacktestConfig, candles: &[Candle]) -> BacktestConfig {
    let mut config = base.clone();
    if let (Some(first), Some(last)) = (candles.first(), candles.last()) {
        config.start_time = first.open_time;
        config.end_time = last.close_time;
    }
    config
}

fn aggregate(results: &[WindowResult]) -> OverallStats {
    if results.is_empty() {
        return OverallStats {
            mean_train_sharpe: Decimal::ZERO,
            mean_test_sharpe: Decimal::ZERO,
            mean_train_return: Decimal::ZERO,
            mean_test_return: Decimal::ZERO,
            consistency_score: Decimal::ZERO,
            train_test_correlation: Decimal::ZERO,
        };
    }

    let train_sharpe: Vec<Decimal> = results.iter().map(|w| w.train_sharpe).collect();
    let test_sharpe: Vec<Decimal> = results.iter().map(|w| w.test_sharpe).collect();
    let train_return: Vec<Decimal> = results.iter().map(|w| w.train_result.total_return).collect();
    let test_return: Vec<Decimal> = results.iter().map(|w| w.test_result.total_return).collect();

    let profitable_windows = results.iter().filter(|w| w.test_result.total_return > Decimal::ZERO).count();
    let consistency_score = Decimal::from_i64(profitable_windows as i64)
        .checked_div(Decimal::from_i64(results.len() as i64))
        .unwrap_or(Decimal::ZERO);

    OverallStats {
        mean_train_sharpe: tradecore_analytics::algorithm::mean(&train_sharpe),
        mean_test_sharpe: tradecore_analytics::algorithm::mean(&test_sharpe),
        mean_train_return: tradecore_analytics::algorithm::mean(&train_return),
        mean_test_return: tradecore_analytics::algorithm::mean(&test_return),
        consistency_score,
        train_test_correlation: tradecore_analytics::algorithm::pearson_correlation(&train_sharpe, &test_sharpe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradecore_decimal::Timestamp;
    use tradecore_markets::Pair;
    use tradecore_trader::{ParameterValue, StrategyContext, StrategyParameter};

    struct DoNothing;
    impl Strategy for DoNothing {
        fn from_params(_params: &ParameterSet) -> Self {
            Self
        }
        fn on_bar(&mut self, _candle: &Candle, _ctx: &mut StrategyContext<'_>) {}
    }

    fn candles(n: i64) -> Vec<Candle> {
        let pair = Pair::parse("BTC/USDT").unwrap();
        (0..n)
            .map(|i| Candle {
                pair: pair.clone(),
                open_time: Timestamp::from_millis(i * 1000),
                close_time: Timestamp::from_millis(i * 1000 + 1000),
                open: Decimal::from_i64(100),
                high: Decimal::from_i64(100),
                low: Decimal::from_i64(100),
                close: Decimal::from_i64(100),
                volume: Decimal::ONE,
            })
            .collect()
    }

    #[test]
    fn flat_market_produces_one_window_per_fixed_ratio_split() {
        let candles = candles(200);
        let base_config = BacktestConfig {
            pair: Pair::parse("BTC/USDT").unwrap(),
            timeframe: "1m".into(),
            start_time: Timestamp::from_millis(0),
            end_time: Timestamp::from_millis(200_000),
            initial_capital: Decimal::from_i64(10_000),
            commission_rate: Decimal::ZERO,
            slippage: Decimal::ZERO,
            data_file: None,
        };
        let split_config = SplitConfig { min_train_size: 50, min_test_size: 20, ..SplitConfig::default() };
        let report = WalkForwardAnalyzer::run::<DoNothing>(
            &candles,
            &base_config,
            vec![StrategyParameter::new("unused", ParameterValue::Int(0))],
            Objective::MaximizeNetProfit,
            &split_config,
        )
        .unwrap();
        assert_eq!(report.windows.len(), 1);
        assert_eq!(report.overall.consistency_score, Decimal::ONE.max(Decimal::ZERO));
    }
}
