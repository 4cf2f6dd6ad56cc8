//! Strategy parameter space: the typed values a strategy is constructed from, and the ranges the
//! grid-search optimizer enumerates when a parameter is marked for optimization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tradecore_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Int(i64),
    Decimal(Decimal),
    Bool(bool),
    Discrete(String),
}

impl ParameterValue {
    pub fn type_tag(&self) -> ParameterType {
        match self {
            ParameterValue::Int(_) => ParameterType::Int,
            ParameterValue::Decimal(_) => ParameterType::Decimal,
            ParameterValue::Bool(_) => ParameterType::Bool,
            ParameterValue::Discrete(_) => ParameterType::Discrete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    Int,
    Decimal,
    Bool,
    Discrete,
}

/// The set of values a parameter marked `optimize: true` is enumerated over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterRange {
    Int { min: i64, max: i64, step: i64 },
    Decimal { min: Decimal, max: Decimal, step: Decimal },
    Bool,
    Discrete(Vec<String>),
}

impl ParameterRange {
    fn type_tag(&self) -> ParameterType {
        match self {
            ParameterRange::Int { .. } => ParameterType::Int,
            ParameterRange::Decimal { .. } => ParameterType::Decimal,
            ParameterRange::Bool => ParameterType::Bool,
            ParameterRange::Discrete(_) => ParameterType::Discrete,
        }
    }

    /// Every concrete value this range covers, in ascending order for numeric ranges.
    pub fn enumerate(&self) -> Vec<ParameterValue> {
        match self {
            ParameterRange::Int { min, max, step } => {
                let step = (*step).max(1);
                let mut values = Vec::new();
                let mut cur = *min;
                while cur <= *max {
                    values.push(ParameterValue::Int(cur));
                    cur += step;
                }
                values
            }
            ParameterRange::Decimal { min, max, step } => {
                let mut values = Vec::new();
                let mut cur = *min;
                while cur <= *max {
                    values.push(ParameterValue::Decimal(cur));
                    cur = cur + *step;
                }
                values
            }
            ParameterRange::Bool => vec![ParameterValue::Bool(false), ParameterValue::Bool(true)],
            ParameterRange::Discrete(options) => {
                options.iter().cloned().map(ParameterValue::Discrete).collect()
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
    #[error("parameter '{name}' is marked optimize=true but has no range")]
    MissingRange { name: String },
    #[error("parameter '{name}' range type does not match its default value type")]
    RangeTypeMismatch { name: String },
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
}

/// A single strategy parameter's declaration: its default, type, and (if it participates in
/// optimization) the range of values the grid search should try.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParameter {
    pub name: String,
    pub default: ParameterValue,
    pub optimize: bool,
    pub range: Option<ParameterRange>,
}

impl StrategyParameter {
    pub fn new(name: impl Into<String>, default: ParameterValue) -> Self {
        Self {
            name: name.into(),
            default,
            optimize: false,
            range: None,
        }
    }

    /// Marks this parameter for optimization over `range`. The range's type must match the
    /// default value's type.
    pub fn optimized_over(mut self, range: ParameterRange) -> Self {
        self.optimize = true;
        self.range = Some(range);
        self
    }

    /// Validates invariant V1: `optimize=true` implies `range` is present and its tag matches
    /// `default`'s type.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !self.optimize {
            return Ok(());
        }
        match &self.range {
            None => Err(ParameterError::MissingRange { name: self.name.clone() }),
            Some(range) if range.type_tag() != self.default.type_tag() => {
                Err(ParameterError::RangeTypeMismatch { name: self.name.clone() })
            }
            Some(_) => Ok(()),
        }
    }
}

/// A concrete, fully-resolved set of parameter values a strategy instance is built from. Owned:
/// every key and discrete value is deep-cloned on insert so the store, not the caller, owns the
/// backing memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    values: BTreeMap<String, ParameterValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a parameter declaration list, using each parameter's default value.
    pub fn from_defaults(params: &[StrategyParameter]) -> Self {
        let values = params
            .iter()
            .map(|p| (p.name.clone(), p.default.clone()))
            .collect();
        Self { values }
    }

    pub fn set(&mut self, name: impl Into<String>, value: ParameterValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn get_int(&self, name: &str) -> Result<i64, ParameterError> {
        match self.get(name) {
            Some(ParameterValue::Int(v)) => Ok(*v),
            _ => Err(ParameterError::UnknownParameter(name.to_string())),
        }
    }

    pub fn get_decimal(&self, name: &str) -> Result<Decimal, ParameterError> {
        match self.get(name) {
            Some(ParameterValue::Decimal(v)) => Ok(*v),
            _ => Err(ParameterError::UnknownParameter(name.to_string())),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, ParameterError> {
        match self.get(name) {
            Some(ParameterValue::Bool(v)) => Ok(*v),
            _ => Err(ParameterError::UnknownParameter(name.to_string())),
        }
    }

    pub fn get_discrete(&self, name: &str) -> Result<&str, ParameterError> {
        match self.get(name) {
            Some(ParameterValue::Discrete(v)) => Ok(v.as_str()),
            _ => Err(ParameterError::UnknownParameter(name.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimize_without_range_fails_validation() {
        let param = StrategyParameter::new("fast_period", ParameterValue::Int(10));
        let mut param = param;
        param.optimize = true;
        assert_eq!(
            param.validate(),
            Err(ParameterError::MissingRange { name: "fast_period".into() })
        );
    }

    #[test]
    fn range_type_mismatch_fails_validation() {
        let param = StrategyParameter::new("fast_period", ParameterValue::Int(10))
            .optimized_over(ParameterRange::Bool);
        assert_eq!(
            param.validate(),
            Err(ParameterError::RangeTypeMismatch { name: "fast_period".into() })
        );
    }

    #[test]
    fn matching_range_type_validates() {
        let param = StrategyParameter::new("fast_period", ParameterValue::Int(10))
            .optimized_over(ParameterRange::Int { min: 5, max: 20, step: 5 });
        assert!(param.validate().is_ok());
    }

    #[test]
    fn int_range_enumerates_inclusive_of_max() {
        let range = ParameterRange::Int { min: 0, max: 10, step: 5 };
        assert_eq!(
            range.enumerate(),
            vec![ParameterValue::Int(0), ParameterValue::Int(5), ParameterValue::Int(10)]
        );
    }

    #[test]
    fn parameter_set_from_defaults_round_trips() {
        let params = vec![
            StrategyParameter::new("a", ParameterValue::Int(1)),
            StrategyParameter::new("b", ParameterValue::Bool(true)),
        ];
        let set = ParameterSet::from_defaults(&params);
        assert_eq!(set.get_int("a").unwrap(), 1);
        assert_eq!(set.get_bool("b").unwrap(), true);
    }
}
