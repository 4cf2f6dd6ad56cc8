//! The JSON shape a hot-reloadable strategy config file parses into.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tradecore_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigParam {
    pub name: String,
    pub value: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    #[serde(default)]
    pub desc: String,
}

impl ConfigParam {
    pub fn in_range(&self) -> bool {
        self.value >= self.min && self.value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub max_position_size: Decimal,
    pub max_daily_loss: Decimal,
    pub max_open_orders: u32,
}

impl RiskConfig {
    fn all_positive(&self) -> bool {
        self.max_position_size > Decimal::ZERO && self.max_daily_loss > Decimal::ZERO && self.max_open_orders > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotReloadConfig {
    pub strategy: String,
    pub version: u32,
    pub params: BTreeMap<String, ConfigParam>,
    pub risk: RiskConfig,
}

#[derive(Debug, Error, PartialEq)]
pub enum HotReloadConfigError {
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("parameter '{name}' = {value} is outside [{min}, {max}]")]
    OutOfRange { name: String, value: Decimal, min: Decimal, max: Decimal },
    #[error("risk config has a non-positive field")]
    InvalidRisk,
    #[error("strategy rejected its own parameters: {0}")]
    StrategyValidationFailed(String),
}

impl HotReloadConfig {
    pub fn parse(raw: &str) -> Result<Self, HotReloadConfigError> {
        serde_json::from_str(raw).map_err(|e| HotReloadConfigError::Parse(e.to_string()))
    }

    /// Checks every `ConfigParam` is within its own declared bounds and every risk field is
    /// positive. Does not invoke strategy-specific validation; the caller does that separately
    /// via the reloadable's own `validate_params`.
    pub fn validate(&self) -> Result<(), HotReloadConfigError> {
        for param in self.params.values() {
            if !param.in_range() {
                return Err(HotReloadConfigError::OutOfRange {
                    name: param.name.clone(),
                    value: param.value,
                    min: param.min,
                    max: param.max,
                });
            }
        }
        if !self.risk.all_positive() {
            return Err(HotReloadConfigError::InvalidRisk);
        }
        Ok(())
    }
}

/// Capability a strategy implements to accept hot-reloaded config.
pub trait HotReloadStrategy {
    fn update_params(&mut self, config: &HotReloadConfig) -> Result<(), String>;
    fn validate_params(&self, config: &HotReloadConfig) -> Result<(), String>;
    fn current_params(&self) -> HotReloadConfig;
}
