//! Account balance tracking: total vs. free collateral per asset.

use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use tradecore_decimal::{Decimal, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Constructor)]
pub struct AssetBalance {
    pub asset: String,
    pub balance: Balance,
    pub time_exchange: Timestamp,
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize, Constructor)]
pub struct Balance {
    pub total: Decimal,
    pub free: Decimal,
}

impl Balance {
    pub fn used(&self) -> Decimal {
        self.total - self.free
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn used_is_total_minus_free() {
        let balance = Balance::new(Decimal::from_i64(1000), Decimal::from_i64(400));
        assert_eq!(balance.used(), Decimal::from_i64(600));
    }
}
