//! Cross-margin account: an aggregate of positions plus a margin summary.

use crate::position::Position;
use serde::{Deserialize, Serialize};
use tradecore_decimal::{Decimal, Timestamp};

/// Cross-margin summary derived from an account's open positions and free collateral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginSummary {
    pub account_value: Decimal,
}

/// A trading account: free collateral plus a set of open [`Position`]s, keyed by coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub free_collateral: Decimal,
    pub positions: Vec<Position>,
    pub updated_at: Timestamp,
}

impl Account {
    pub fn new(id: impl Into<String>, free_collateral: Decimal, now: Timestamp) -> Self {
        Self {
            id: id.into(),
            free_collateral,
            positions: Vec::new(),
            updated_at: now,
        }
    }

    pub fn position(&self, coin: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.coin == coin)
    }

    pub fn position_mut(&mut self, coin: &str) -> Option<&mut Position> {
        self.positions.iter_mut().find(|p| p.coin == coin)
    }

    /// Inserts `position`, replacing any existing entry for the same coin.
    pub fn upsert_position(&mut self, position: Position) {
        if let Some(existing) = self.position_mut(&position.coin) {
            *existing = position;
        } else {
            self.positions.push(position);
        }
    }

    /// Drops positions that have returned to flat, matching the teacher's convention of keeping
    /// only positions with non-zero size in the live account view.
    pub fn prune_flat_positions(&mut self) {
        self.positions.retain(|p| !p.is_flat());
    }

    /// Sum of realized PnL across every position the account has ever held (closed or open).
    pub fn total_realized_pnl(&self) -> Decimal {
        self.positions
            .iter()
            .fold(Decimal::ZERO, |acc, p| acc + p.realized_pnl)
    }

    /// Sum of unrealized PnL across currently open positions.
    pub fn total_unrealized_pnl(&self) -> Decimal {
        self.positions
            .iter()
            .fold(Decimal::ZERO, |acc, p| acc + p.unrealized_pnl)
    }

    /// Cross-margin account value: free collateral plus unrealized PnL across open positions.
    pub fn margin_summary(&self) -> MarginSummary {
        MarginSummary {
            account_value: self.free_collateral + self.total_unrealized_pnl(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Leverage;
    use crate::side::Side;

    fn ts(ms: i64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn upsert_and_prune_flat_positions() {
        let mut account = Account::new("acct-1", Decimal::from_i64(10_000), ts(0));
        let mut position = Position::flat("BTC", Leverage::cross(Decimal::from_i64(1)), ts(0));
        position
            .apply_fill(Side::Buy, Decimal::from_i64(1), Decimal::from_i64(2000), ts(1))
            .unwrap();
        account.upsert_position(position.clone());
        assert_eq!(account.position("BTC"), Some(&position));

        position
            .apply_fill(Side::Sell, Decimal::from_i64(1), Decimal::from_i64(2100), ts(2))
            .unwrap();
        account.upsert_position(position);
        account.prune_flat_positions();
        assert!(account.position("BTC").is_none());
    }

    #[test]
    fn margin_summary_adds_unrealized_pnl_to_free_collateral() {
        let mut account = Account::new("acct-1", Decimal::from_i64(10_000), ts(0));
        let mut position = Position::flat("ETH", Leverage::cross(Decimal::from_i64(1)), ts(0));
        position
            .apply_fill(Side::Buy, Decimal::from_i64(1), Decimal::from_i64(2000), ts(1))
            .unwrap();
        position.mark(Decimal::from_i64(2100), ts(2));
        account.upsert_position(position);

        assert_eq!(
            account.margin_summary().account_value,
            Decimal::from_i64(10_100)
        );
    }
}
