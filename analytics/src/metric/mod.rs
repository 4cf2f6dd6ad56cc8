//! Individual performance metrics. Each is a small, independently testable calculation; the
//! orchestration layer above this crate is responsible for feeding them the right inputs (an
//! equity curve, a trade ledger, a return series) at the right cadence.

pub mod calmar;
pub mod drawdown;
pub mod profit_factor;
pub mod sharpe;
pub mod sortino;
pub mod win_rate;

pub use calmar::CalmarRatio;
pub use drawdown::{Drawdown, DrawdownGenerator};
pub use profit_factor::ProfitFactor;
pub use sharpe::SharpeRatio;
pub use sortino::SortinoRatio;
pub use win_rate::WinRate;
