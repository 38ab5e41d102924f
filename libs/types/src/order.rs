//! Order lifecycle types
//!
//! Orders carry an explicit status, but the non-terminal statuses are purely
//! a function of fill progress: `Pending` while nothing is filled, `Partial`
//! once some quantity is, `Filled` when all of it is. The mutators re-derive
//! the status on every fill so the two can never disagree. `Cancelled` and
//! `Expired` are terminal and set only by explicit action.

use crate::ids::{AgentId, ItemId, OrderId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

/// Order status
///
/// `Pending`, `Partial` and `Filled` are derived from fill progress;
/// `Cancelled` and `Expired` are terminal and set explicitly. `Expired`
/// exists for completeness of the model; no simulator component sets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Accepted, nothing filled yet
    Pending,
    /// Partially filled, still matchable
    Partial,
    /// Completely filled (terminal)
    Filled,
    /// Withdrawn by its owner (terminal)
    Cancelled,
    /// Lifetime elapsed (terminal)
    Expired,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Expired
        )
    }
}

/// A limit order on a collectible item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub item_id: ItemId,
    pub agent_id: AgentId,
    pub side: Side,
    pub price: Decimal,
    pub quantity: u32,
    pub filled_quantity: u32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Arrival ordinal assigned by the engine at acceptance; authoritative
    /// time-priority tiebreak (creation timestamps within one simulation
    /// step are not unique)
    pub sequence: u64,
}

impl Order {
    /// Create a new pending order
    ///
    /// The engine validates price and quantity at submission and assigns
    /// the arrival sequence.
    pub fn new(
        item_id: ItemId,
        agent_id: AgentId,
        side: Side,
        price: Decimal,
        quantity: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            item_id,
            agent_id,
            side,
            price,
            quantity,
            filled_quantity: 0,
            status: OrderStatus::Pending,
            created_at,
            sequence: 0,
        }
    }

    /// Quantity still open for matching
    pub fn remaining_quantity(&self) -> u32 {
        self.quantity - self.filled_quantity
    }

    /// Check if the order can still match (pending or partially filled)
    pub fn is_active(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Partial)
    }

    /// Nominal value of the full order (price × quantity)
    pub fn total_value(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// Record a fill and re-derive the status
    ///
    /// # Panics
    /// Panics if the order is not active, the fill is zero, or the fill
    /// would exceed the remaining quantity
    pub fn add_fill(&mut self, fill_quantity: u32) {
        assert!(self.is_active(), "Cannot fill inactive order");
        assert!(fill_quantity > 0, "Fill quantity must be positive");
        assert!(
            fill_quantity <= self.remaining_quantity(),
            "Fill would exceed order quantity"
        );

        self.filled_quantity += fill_quantity;

        self.status = if self.filled_quantity == self.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
    }

    /// Cancel the order
    ///
    /// # Panics
    /// Panics if the order is already in a terminal state
    pub fn cancel(&mut self) {
        assert!(!self.status.is_terminal(), "Cannot cancel terminal order");
        self.status = OrderStatus::Cancelled;
    }

    /// Check whether two orders could trade against each other:
    /// same item, opposite sides, different agents, crossing prices
    pub fn can_match_with(&self, other: &Order) -> bool {
        if self.item_id != other.item_id
            || self.side == other.side
            || self.agent_id == other.agent_id
            || !self.is_active()
            || !other.is_active()
        {
            return false;
        }

        let (buy, sell) = match self.side {
            Side::BUY => (self, other),
            Side::SELL => (other, self),
        };
        buy.price >= sell.price
    }
}
