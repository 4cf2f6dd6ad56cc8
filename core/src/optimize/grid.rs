//! Cartesian-product parameter sweep: materializes a `ParameterSet` per combination, runs a
//! fresh backtest for each (no state leaks across runs), and scores the result against a chosen
//! objective.

use std::sync::Arc;

use thiserror::Error;
use tradecore_analytics::algorithm::{downside_deviation, mean, population_std_dev};
use tradecore_analytics::metric::{CalmarRatio, SortinoRatio, SharpeRatio};
use tradecore_analytics::time::Daily;
use tradecore_decimal::Decimal;
use tradecore_markets::Candle;
use tradecore_trader::{ParameterError, ParameterSet, ParameterValue, Strategy, StrategyParameter};

use crate::backtest::{BacktestConfig, BacktestEngine, BacktestResult};
use crate::optimize::pool::ThreadPool;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("parameter '{0}' is invalid: {1}")]
    InvalidParameter(String, ParameterError),
    #[error("cartesian product of parameter ranges ({0}) exceeds u32::MAX")]
    CombinationOverflow(u128),
}

/// Scoring target for a grid-search run. `minimize_*` variants are scored as the negation of the
/// corresponding `maximize_*` metric so `best_score` is always the maximum over all results.
#[derive(Clone)]
pub enum Objective {
    MaximizeSharpe,
    MaximizeProfitFactor,
    MaximizeWinRate,
    MinimizeMaxDrawdown,
    MaximizeNetProfit,
    MaximizeTotalReturn,
    MaximizeSortino,
    MaximizeCalmar,
    MaximizeOmega,
    MaximizeTail,
    MaximizeStability,
    MaximizeRiskAdjusted,
    Custom(Arc<dyn Fn(&BacktestResult) -> Decimal + Send + Sync>),
}

pub struct OptimizationConfig {
    pub objective: Objective,
    pub backtest_config: BacktestConfig,
    pub parameters: Vec<StrategyParameter>,
    pub max_combinations: Option<u32>,
    pub enable_parallel: bool,
}

#[derive(Debug, Clone)]
pub struct TrialResult {
    pub params: ParameterSet,
    pub score: Decimal,
    pub error: Option<String>,
}

pub struct GridSearchReport {
    pub best_params: Option<ParameterSet>,
    pub best_score: Decimal,
    pub all_results: Vec<TrialResult>,
    pub total_combinations: usize,
    pub elapsed_time_ms: u128,
}

pub struct GridSearchOptimizer;

impl GridSearchOptimizer {
    /// Enumerates the Cartesian product of every `optimize=true` parameter's range, crossed with
    /// the defaults of every other parameter.
    fn enumerate(parameters: &[StrategyParameter]) -> Result<Vec<ParameterSet>, OptimizeError> {
        for param in parameters {
            param.validate().map_err(|e| OptimizeError::InvalidParameter(param.name.clone(), e))?;
        }

        let base = ParameterSet::from_defaults(parameters);
        let axes: Vec<(&str, Vec<ParameterValue>)> = parameters
            .iter()
            .filter(|p| p.optimize)
            .map(|p| (p.name.as_str(), p.range.as_ref().expect("validated above").enumerate()))
            .collect();

        let total: u128 = axes.iter().map(|(_, values)| values.len() as u128).product::<u128>().max(1);
        if total > u32::MAX as u128 {
            return Err(OptimizeError::CombinationOverflow(total));
        }

        let mut combinations = vec![base];
        for (name, values) in &axes {
            let mut next = Vec::with_capacity(combinations.len() * values.len());
            for combo in &combinations {
                for value in values {
                    let mut combo = combo.clone();
                    combo.set(*name, value.clone());
                    next.push(combo);
                }
            }
            combinations = next;
        }
        Ok(combinations)
    }

    pub fn run<S: Strategy>(candles: &[Candle], config: OptimizationConfig) -> Result<GridSearchReport, OptimizeError> {
        let started = std::time::Instant::now();
        let mut combinations = Self::enumerate(&config.parameters)?;
        let total_combinations = combinations.len();
        if let Some(max) = config.max_combinations {
            combinations.truncate(max as usize);
        }

        let backtest_config = config.backtest_config.clone();
        let objective = config.objective.clone_ref();
        let run_one = move |_ctx: &(), index: usize, params: &ParameterSet| -> TrialResult {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                BacktestEngine::new().run::<S>(params, candles, backtest_config.clone(), None, None)
            }));
            match result {
                Ok(backtest_result) => TrialResult {
                    params: params.clone(),
                    score: objective.score(&backtest_result),
                    error: None,
                },
                Err(_) => {
                    let _ = index;
                    TrialResult { params: params.clone(), score: Decimal::MIN, error: Some("backtest panicked".into()) }
                }
            }
        };

        let trials: Vec<TrialResult> = if config.enable_parallel && combinations.len() > 1 {
            let pool = ThreadPool::with_default_threads();
            pool.execute(|combos: &Vec<ParameterSet>, i| run_one(&(), i, &combos[i]), combinations.clone(), combinations.len())
        } else {
            combinations.iter().enumerate().map(|(i, params)| run_one(&(), i, params)).collect()
        };

        let best = trials
            .iter()
            .filter(|t| t.error.is_none())
            .max_by(|a, b| a.score.cmp_total(&b.score));

        let best_params = best.map(|t| t.params.clone());
        let best_score = best.map(|t| t.score).unwrap_or(Decimal::MIN);

        Ok(GridSearchReport {
            best_params,
            best_score,
            all_results: trials,
            total_combinations,
            elapsed_time_ms: started.elapsed().as_millis(),
        })
    }
}

impl Objective {
    fn clone_ref(&self) -> Self {
        self.clone()
    }

    pub fn score(&self, result: &BacktestResult) -> Decimal {
        let returns = bar_returns(result);
        match self {
            Objective::MaximizeSharpe => sharpe(&returns),
            Objective::MaximizeProfitFactor => result.profit_factor.map(|p| p.0).unwrap_or(Decimal::ZERO),
            Objective::MaximizeWinRate => result.win_rate.map(|w| w.0).unwrap_or(Decimal::ZERO),
            Objective::MinimizeMaxDrawdown => -result.max_drawdown,
            Objective::MaximizeNetProfit => result.net_profit,
            Objective::MaximizeTotalReturn => result.total_return,
            Objective::MaximizeSortino => sortino(&returns),
            Objective::MaximizeCalmar => calmar(result),
            Objective::MaximizeOmega => result.profit_factor.map(|p| p.0).unwrap_or(Decimal::ZERO),
            Objective::MaximizeTail => tail_ratio(&returns),
            Objective::MaximizeStability => stability(&returns),
            Objective::MaximizeRiskAdjusted => calmar(result),
            Objective::Custom(f) => f(result),
        }
    }
}

fn bar_returns(result: &BacktestResult) -> Vec<Decimal> {
    result
        .equity_curve
        .windows(2)
        .map(|pair| (pair[1].equity - pair[0].equity).checked_div(pair[0].equity).unwrap_or(Decimal::ZERO))
        .collect()
}

fn sharpe(returns: &[Decimal]) -> Decimal {
    if returns.is_empty() {
        return Decimal::ZERO;
    }
    SharpeRatio::calculate(Decimal::ZERO, mean(returns), population_std_dev(returns), Daily).value
}

fn sortino(returns: &[Decimal]) -> Decimal {
    if returns.is_empty() {
        return Decimal::ZERO;
    }
    let downside = downside_deviation(returns, Decimal::ZERO);
    SortinoRatio::calculate(Decimal::ZERO, mean(returns), downside, Daily).value
}

fn calmar(result: &BacktestResult) -> Decimal {
    CalmarRatio::calculate(result.total_return, result.max_drawdown).0
}

fn tail_ratio(returns: &[Decimal]) -> Decimal {
    let gains: Vec<Decimal> = returns.iter().copied().filter(|r| r.is_sign_positive()).collect();
    let losses: Vec<Decimal> = returns.iter().copied().filter(|r| r.is_sign_negative()).collect();
    if losses.is_empty() {
        return Decimal::MAX;
    }
    mean(&gains).checked_div(mean(&losses).abs()).unwrap_or(Decimal::ZERO)
}

fn stability(returns: &[Decimal]) -> Decimal {
    if returns.len() < 2 {
        return Decimal::ZERO;
    }
    let indices: Vec<Decimal> = (0..returns.len() as i64).map(Decimal::from_i64).collect();
    let cumulative: Vec<Decimal> = returns
        .iter()
        .scan(Decimal::ZERO, |acc, r| {
            *acc = *acc + *r;
            Some(*acc)
        })
        .collect();
    tradecore_analytics::algorithm::pearson_correlation(&indices, &cumulative).abs()
}
