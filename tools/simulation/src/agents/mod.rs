//! Market participant agents
//!
//! Buyers and sellers share an `AgentState` (cash, inventory, open orders,
//! personality traits) and differ in strategy. Dispatch is a plain enum; the
//! manager owns the agents and the RNG, agents never touch the wall clock or
//! a private RNG of their own.

pub mod buyer;
pub mod seller;

pub use buyer::Buyer;
pub use seller::Seller;

use chrono::{DateTime, Utc};
use matching_engine::MarketEngine;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;
use types::ids::{AgentId, ItemId, OrderId};
use types::order::Order;

/// Valuation used for holdings with no trade history and no quotes.
const FALLBACK_ITEM_VALUE: Decimal = Decimal::from_parts(1000, 0, 0, false, 2);

/// Sample a decimal factor from U[lo, hi).
pub(crate) fn decimal_between(rng: &mut impl Rng, lo: f64, hi: f64) -> Decimal {
    Decimal::from_f64(rng.gen_range(lo..hi)).unwrap_or(Decimal::ONE)
}

/// State shared by every agent kind.
#[derive(Debug, Clone)]
pub struct AgentState {
    pub id: AgentId,
    /// May go negative only through a settlement inconsistency; logged,
    /// never clamped
    pub cash: Decimal,
    pub inventory: BTreeMap<ItemId, u32>,
    /// Orders this agent believes are open; pruned by the manager each step
    pub active_orders: Vec<OrderId>,
    /// Lifetime count of successfully submitted orders
    pub orders_placed: u64,
    pub risk_tolerance: f64,
    pub patience: f64,
    pub market_knowledge: f64,
}

impl AgentState {
    /// Create state with personality traits sampled from the run RNG.
    pub fn new(id: AgentId, cash: Decimal, rng: &mut ChaCha8Rng) -> Self {
        Self {
            id,
            cash,
            inventory: BTreeMap::new(),
            active_orders: Vec::new(),
            orders_placed: 0,
            risk_tolerance: rng.gen_range(0.1..0.9),
            patience: rng.gen_range(0.2..0.8),
            market_knowledge: rng.gen_range(0.3..0.9),
        }
    }

    /// Units of an item currently held.
    pub fn item_quantity(&self, item_id: ItemId) -> u32 {
        self.inventory.get(&item_id).copied().unwrap_or(0)
    }

    /// Add units of an item to the inventory.
    pub fn add_item(&mut self, item_id: ItemId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        *self.inventory.entry(item_id).or_insert(0) += quantity;
    }

    /// Remove units of an item. Returns false and changes nothing when the
    /// holding is insufficient; empty entries are dropped.
    pub fn remove_item(&mut self, item_id: ItemId, quantity: u32) -> bool {
        match self.inventory.get_mut(&item_id) {
            Some(held) if *held >= quantity => {
                *held -= quantity;
                if *held == 0 {
                    self.inventory.remove(&item_id);
                }
                true
            }
            _ => false,
        }
    }

    /// Check whether cash covers `price × quantity`.
    pub fn can_afford(&self, price: Decimal, quantity: u32) -> bool {
        self.cash >= price * Decimal::from(quantity)
    }

    /// Apply a signed cash delta.
    pub fn update_cash(&mut self, delta: Decimal) {
        self.cash += delta;
        if self.cash < Decimal::ZERO {
            warn!(agent_id = %self.id, cash = %self.cash, "agent cash is negative");
        }
    }

    /// Cash plus marked inventory value. Holdings are valued at last trade
    /// price, then mid price, then a fixed fallback.
    pub fn portfolio_value(&self, engine: &MarketEngine, now: DateTime<Utc>) -> Decimal {
        let mut value = self.cash;
        for (item_id, quantity) in &self.inventory {
            let price = engine
                .get_market_snapshot(*item_id, now)
                .ok()
                .and_then(|s| s.last_price.or_else(|| s.mid_price()))
                .unwrap_or(FALLBACK_ITEM_VALUE);
            value += price * Decimal::from(*quantity);
        }
        value
    }
}

/// A market participant.
#[derive(Debug, Clone)]
pub enum Agent {
    Buyer(Buyer),
    Seller(Seller),
}

impl Agent {
    pub fn id(&self) -> &AgentId {
        &self.state().id
    }

    pub fn state(&self) -> &AgentState {
        match self {
            Agent::Buyer(b) => &b.state,
            Agent::Seller(s) => &s.state,
        }
    }

    pub fn state_mut(&mut self) -> &mut AgentState {
        match self {
            Agent::Buyer(b) => &mut b.state,
            Agent::Seller(s) => &mut s.state,
        }
    }

    pub fn is_buyer(&self) -> bool {
        matches!(self, Agent::Buyer(_))
    }

    pub fn is_seller(&self) -> bool {
        matches!(self, Agent::Seller(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Agent::Buyer(_) => "Buyer",
            Agent::Seller(_) => "Seller",
        }
    }

    /// Decide whether to place an order this step.
    pub fn act(
        &self,
        engine: &MarketEngine,
        step: u64,
        now: DateTime<Utc>,
        rng: &mut ChaCha8Rng,
    ) -> Option<Order> {
        match self {
            Agent::Buyer(b) => b.act(engine, step, now, rng),
            Agent::Seller(s) => s.act(engine, step, now, rng),
        }
    }

    /// Snapshot of the agent for artifacts and checkpoints.
    pub fn report(&self) -> AgentReport {
        let state = self.state();
        AgentReport {
            id: state.id.clone(),
            kind: self.kind().to_string(),
            cash: state.cash.to_f64().unwrap_or(0.0),
            inventory: state.inventory.clone(),
            risk_tolerance: state.risk_tolerance,
            patience: state.patience,
            market_knowledge: state.market_knowledge,
            active_orders_count: state.active_orders.len(),
        }
    }
}

/// Per-agent entry in the results artifact and in checkpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReport {
    pub id: AgentId,
    #[serde(rename = "type")]
    pub kind: String,
    pub cash: f64,
    pub inventory: BTreeMap<ItemId, u32>,
    pub risk_tolerance: f64,
    pub patience: f64,
    pub market_knowledge: f64,
    pub active_orders_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn test_state(cash: u32) -> AgentState {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        AgentState::new(AgentId::new("agent_1"), Decimal::from(cash), &mut rng)
    }

    #[test]
    fn test_traits_within_ranges() {
        let state = test_state(1000);
        assert!((0.1..0.9).contains(&state.risk_tolerance));
        assert!((0.2..0.8).contains(&state.patience));
        assert!((0.3..0.9).contains(&state.market_knowledge));
    }

    #[test]
    fn test_inventory_add_remove() {
        let mut state = test_state(1000);
        let item = ItemId::new(3);

        state.add_item(item, 5);
        assert_eq!(state.item_quantity(item), 5);

        assert!(state.remove_item(item, 2));
        assert_eq!(state.item_quantity(item), 3);

        // Insufficient holding: refused, untouched
        assert!(!state.remove_item(item, 10));
        assert_eq!(state.item_quantity(item), 3);

        // Removing the rest drops the entry
        assert!(state.remove_item(item, 3));
        assert_eq!(state.item_quantity(item), 0);
        assert!(state.inventory.is_empty());
    }

    #[test]
    fn test_can_afford() {
        let state = test_state(100);
        assert!(state.can_afford(Decimal::from(10), 10));
        assert!(!state.can_afford(Decimal::from(10), 11));
    }

    #[test]
    fn test_update_cash_allows_negative() {
        let mut state = test_state(10);
        state.update_cash(Decimal::from(-25));
        assert_eq!(state.cash, Decimal::from(-15));
    }

    #[test]
    fn test_portfolio_value_fallback_pricing() {
        let state = {
            let mut s = test_state(100);
            s.add_item(ItemId::new(1), 2);
            s
        };
        // Item is not in the engine catalog, so the fallback value applies
        let engine = MarketEngine::new();
        let value = state.portfolio_value(&engine, Utc::now());
        assert_eq!(value, Decimal::from(100) + FALLBACK_ITEM_VALUE * Decimal::from(2));
    }

    #[test]
    fn test_report_serializes_type_field() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let buyer = Buyer::new(AgentId::new("buyer_1"), Decimal::from(800), &mut rng);
        let agent = Agent::Buyer(buyer);

        let json = serde_json::to_string(&agent.report()).unwrap();
        assert!(json.contains("\"type\":\"Buyer\""));
        assert!(json.contains("\"active_orders_count\":0"));
    }

    #[test]
    fn test_report_inventory_round_trip() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut seller = Seller::new(AgentId::new("seller_1"), Decimal::from(500), &[], &mut rng);
        seller.state.add_item(ItemId::new(4), 7);
        let report = Agent::Seller(seller).report();

        let json = serde_json::to_string(&report).unwrap();
        let back: AgentReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.inventory.get(&ItemId::new(4)), Some(&7));
        assert_eq!(back.kind, "Seller");
    }
}
