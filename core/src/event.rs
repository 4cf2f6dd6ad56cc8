//! The engine's own event type, published on the engine's [`tradecore_integration::Bus`]
//! alongside (not instead of) the raw [`tradecore_data::MarketEvent`] stream.

use serde::{Deserialize, Serialize};
use tradecore_decimal::{Decimal, Timestamp};
use tradecore_execution::order::{ClientOrderId, OrderStatus};
use tradecore_markets::Pair;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Tick {
        timestamp: Timestamp,
        tick_number: u64,
    },
    Shutdown {
        reason: String,
        message: String,
    },
    OrderSubmitted {
        client_order_id: ClientOrderId,
        pair: Pair,
    },
    OrderRejected {
        client_order_id: ClientOrderId,
        reason: String,
    },
    OrderCancelled {
        client_order_id: ClientOrderId,
    },
    OrderUpdated {
        client_order_id: ClientOrderId,
        status: OrderStatus,
    },
    OrderFilled {
        client_order_id: ClientOrderId,
        fill_quantity: Decimal,
        fill_price: Decimal,
    },
    Market(tradecore_data::MarketEvent),
    EngineStarted {
        at: Timestamp,
    },
    EngineStopped {
        at: Timestamp,
    },
    RecoveryComplete {
        recovered: usize,
    },
    TimeoutCheck {
        timed_out: usize,
    },
}

impl Event {
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Event::Shutdown { .. })
    }
}
