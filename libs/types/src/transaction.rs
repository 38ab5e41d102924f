//! Executed trade records
//!
//! A `Transaction` is the immutable result of matching a buy order against a
//! sell order. The execution price is always the resting order's limit price;
//! the engine enforces that before constructing the record.

use crate::ids::{AgentId, ItemId, OrderId, TransactionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An executed exchange of items for cash between two agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Global monotonic sequence assigned by the engine
    pub sequence: u64,
    pub item_id: ItemId,

    // Order references
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,

    // Counterparties
    pub buyer_id: AgentId,
    pub seller_id: AgentId,

    // Execution details
    pub price: Decimal,
    pub quantity: u32,
    pub executed_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        item_id: ItemId,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        buyer_id: AgentId,
        seller_id: AgentId,
        price: Decimal,
        quantity: u32,
        executed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            sequence,
            item_id,
            buy_order_id,
            sell_order_id,
            buyer_id,
            seller_id,
            price,
            quantity,
            executed_at,
        }
    }

    /// Cash moved by this transaction (price × quantity)
    pub fn total_value(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// Check the no-self-trade invariant
    pub fn validate_no_self_trade(&self) -> bool {
        self.buyer_id != self.seller_id
    }
}
