//! Types library for the collectibles market simulator
//!
//! This library provides the core domain types shared by the matching engine
//! and the simulation framework: catalog items, orders, transactions,
//! identifiers, and the error taxonomy.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, TransactionId, AgentId, ItemId)
//! - `item`: Collectible items and categories
//! - `order`: Order lifecycle types
//! - `transaction`: Executed trade records
//! - `errors`: Error taxonomy

// Public modules
pub mod errors;
pub mod ids;
pub mod item;
pub mod order;
pub mod transaction;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::item::*;
    pub use crate::order::*;
    pub use crate::transaction::*;
}
