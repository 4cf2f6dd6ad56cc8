//! Fluent construction of a sync [`LiveTradingEngine`], wiring the data engine, execution venue,
//! and risk manager together with validation at each step rather than panicking on a bad config.

use std::sync::Arc;

use tradecore_data::DataEngine;
use tradecore_decimal::Timestamp;
use tradecore_execution::{SimulatedExecutor, SimulatedExecutorConfig};
use tradecore_risk::{NoRiskManager, RiskGateConfig, RiskGate};

use crate::error::CoreError;
use crate::live::LiveTradingEngine;
use crate::system::config::{ExecutionConfig, RiskLimits};

/// Chooses which [`tradecore_risk::RiskManager`] a built system gates orders through.
pub enum RiskMode {
    None,
    Gated(RiskLimits),
}

pub struct SystemBuilder {
    data_engine: Option<DataEngine>,
    execution: Option<ExecutionConfig>,
    risk: RiskMode,
}

impl Default for SystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemBuilder {
    pub fn new() -> Self {
        Self { data_engine: None, execution: None, risk: RiskMode::None }
    }

    pub fn data_engine(mut self, data_engine: DataEngine) -> Self {
        self.data_engine = Some(data_engine);
        self
    }

    pub fn execution(mut self, config: ExecutionConfig) -> Self {
        self.execution = Some(config);
        self
    }

    pub fn risk_gated(mut self, limits: RiskLimits) -> Self {
        self.risk = RiskMode::Gated(limits);
        self
    }

    /// Wires `Bus → Cache → DataEngine → ExecutionEngine → LiveTradingEngine`, returning
    /// `CoreError::Configuration` on anything left unset or inconsistent rather than panicking.
    pub fn build(self, now: Timestamp) -> Result<BuiltSystem, CoreError> {
        let data_engine = self.data_engine.ok_or_else(|| CoreError::Configuration("no data engine configured".into()))?;
        if data_engine.provider_count() == 0 {
            return Err(CoreError::Configuration("data engine has no providers".into()));
        }
        let execution = self.execution.ok_or_else(|| CoreError::Configuration("no execution config provided".into()))?;

        let executor = Arc::new(SimulatedExecutor::new(
            SimulatedExecutorConfig {
                slippage_bps: execution.slippage_bps,
                commission_rate: execution.commission_rate,
                starting_collateral: execution.starting_collateral,
                leverage: execution.leverage,
            },
            now,
        ));

        match self.risk {
            RiskMode::None => {
                let mut engine = LiveTradingEngine::new(data_engine, NoRiskManager);
                engine.start(Arc::clone(&executor), now)?;
                Ok(BuiltSystem::Unrestricted(engine))
            }
            RiskMode::Gated(limits) => {
                if !limits.is_valid() {
                    return Err(CoreError::Configuration("risk limits must all be positive".into()));
                }
                let risk = RiskGate::new(RiskGateConfig {
                    min_order_interval_ms: limits.min_order_interval_ms,
                    max_order_size: limits.max_position_size,
                    max_open_orders: limits.max_open_orders as usize,
                    allowed_symbols: Vec::new(),
                });
                let mut engine = LiveTradingEngine::new(data_engine, risk);
                engine.start(Arc::clone(&executor), now)?;
                Ok(BuiltSystem::Gated(engine))
            }
        }
    }
}

/// The two shapes a built system can take, depending on which [`RiskMode`] was selected. Kept as
/// an enum rather than a boxed trait object since `LiveTradingEngine<C, R>` is generic over the
/// concrete risk manager type, which callers generally know statically.
pub enum BuiltSystem {
    Unrestricted(LiveTradingEngine<SimulatedExecutor, NoRiskManager>),
    Gated(LiveTradingEngine<SimulatedExecutor, RiskGate>),
}

impl From<crate::live::LiveEngineError> for CoreError {
    fn from(error: crate::live::LiveEngineError) -> Self {
        CoreError::Configuration(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradecore_data::ReplayProvider;
    use tradecore_decimal::Decimal;
    use tradecore_markets::Pair;

    fn execution_config() -> ExecutionConfig {
        ExecutionConfig {
            pair: Pair::parse("BTC/USDT").unwrap(),
            slippage_bps: Decimal::ZERO,
            commission_rate: Decimal::ZERO,
            starting_collateral: Decimal::from_i64(10_000),
            leverage: Decimal::ONE,
        }
    }

    #[test]
    fn build_without_data_engine_is_a_configuration_error() {
        let result = SystemBuilder::new().execution(execution_config()).build(Timestamp::ZERO);
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn build_with_empty_data_engine_is_a_configuration_error() {
        let result = SystemBuilder::new().data_engine(DataEngine::new()).execution(execution_config()).build(Timestamp::ZERO);
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn build_with_provider_and_no_risk_succeeds() {
        let mut data_engine = DataEngine::new();
        data_engine.add_provider(Box::new(ReplayProvider::new(Vec::new())));
        let result = SystemBuilder::new().data_engine(data_engine).execution(execution_config()).build(Timestamp::ZERO);
        assert!(matches!(result, Ok(BuiltSystem::Unrestricted(_))));
    }

    #[test]
    fn build_with_invalid_risk_limits_is_rejected() {
        let mut data_engine = DataEngine::new();
        data_engine.add_provider(Box::new(ReplayProvider::new(Vec::new())));
        let limits = RiskLimits { max_position_size: Decimal::ZERO, max_open_orders: 1, max_daily_loss: Decimal::ONE, min_order_interval_ms: 0 };
        let result = SystemBuilder::new().data_engine(data_engine).execution(execution_config()).risk_gated(limits).build(Timestamp::ZERO);
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }
}
