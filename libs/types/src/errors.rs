//! Error types for the marketplace simulator
//!
//! Single taxonomy using thiserror. Invalid orders are rejected with a
//! reason before any state change; lookup misses carry the offending id.
//! Cancel rejections are deliberately NOT errors: `cancel_order` returns a
//! plain bool, because a failed cancel is an expected outcome, not a fault.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level error for engine and simulation operations
#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Invalid order: {reason}")]
    InvalidOrder { reason: String },

    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: String },

    #[error("Item not found: {item_id}")]
    ItemNotFound { item_id: u32 },

    #[error("Item already in catalog: {item_id}")]
    DuplicateItem { item_id: u32 },

    #[error("Agent not found: {agent_id}")]
    AgentNotFound { agent_id: String },

    // Reserved for stricter validation paths; not raised by current engine logic.
    #[error("Market is closed")]
    MarketClosed,

    #[error("Insufficient liquidity for item {item_id}")]
    InsufficientLiquidity { item_id: u32 },

    #[error("Price {price} outside accepted range")]
    PriceOutOfRange { price: Decimal },

    #[error("Unknown scenario: {name} (available: {available})")]
    UnknownScenario { name: String, available: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MarketError {
    /// Shorthand for order validation failures
    pub fn invalid_order(reason: impl Into<String>) -> Self {
        MarketError::InvalidOrder {
            reason: reason.into(),
        }
    }
}
