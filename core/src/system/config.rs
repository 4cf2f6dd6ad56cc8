//! Top-level configuration a binary embedding this crate deserializes from disk to assemble a
//! running system via [`super::builder::SystemBuilder`].

use serde::{Deserialize, Serialize};
use tradecore_decimal::Decimal;
use tradecore_markets::Pair;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub pair: Pair,
    pub slippage_bps: Decimal,
    pub commission_rate: Decimal,
    pub starting_collateral: Decimal,
    pub leverage: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    pub max_position_size: Decimal,
    pub max_open_orders: u32,
    pub max_daily_loss: Decimal,
    pub min_order_interval_ms: i64,
}

impl RiskLimits {
    pub fn is_valid(&self) -> bool {
        self.max_position_size > Decimal::ZERO && self.max_open_orders > 0 && self.max_daily_loss > Decimal::ZERO
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSettings {
    pub pair: Pair,
    pub timeframe: String,
    pub initial_capital: Decimal,
    pub commission_rate: Decimal,
    pub slippage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub execution: ExecutionConfig,
    pub risk_limits: RiskLimits,
    pub backtest: Option<BacktestSettings>,
    pub tick_interval_ms: u64,
    pub heartbeat_interval_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SystemConfig {
        SystemConfig {
            execution: ExecutionConfig {
                pair: Pair::parse("BTC/USDT").unwrap(),
                slippage_bps: Decimal::ZERO,
                commission_rate: Decimal::ZERO,
                starting_collateral: Decimal::from_i64(10_000),
                leverage: Decimal::ONE,
            },
            risk_limits: RiskLimits {
                max_position_size: Decimal::from_i64(5),
                max_open_orders: 10,
                max_daily_loss: Decimal::from_i64(500),
                min_order_interval_ms: 0,
            },
            backtest: None,
            tick_interval_ms: 1000,
            heartbeat_interval_ms: 30_000,
        }
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = config();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn risk_limits_reject_zero_max_position() {
        let mut cfg = config();
        cfg.risk_limits.max_position_size = Decimal::ZERO;
        assert!(!cfg.risk_limits.is_valid());
    }
}
