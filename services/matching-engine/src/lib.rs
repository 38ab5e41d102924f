//! Matching Engine
//!
//! Continuous double-auction matching for the collectibles marketplace,
//! with strict price-time priority.
//!
//! The engine owns the authoritative order and transaction stores plus the
//! item catalog. Order books and market snapshots are derived views computed
//! on demand; nothing market-facing is cached or stored twice.
//!
//! **Key Invariants:**
//! - Price-time priority strictly enforced (price, then arrival sequence)
//! - Execution price is always the resting order's limit price
//! - No self-trades
//! - Conservation of quantity
//! - Submission is atomic: validation rejects before any state change

pub mod book;
pub mod engine;
pub mod matching;
pub mod snapshot;

pub use book::{BookEntry, OrderBookView};
pub use engine::MarketEngine;
pub use snapshot::{MarketSnapshot, PriceTrend};
