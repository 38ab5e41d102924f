//! Seller agent
//!
//! Sellers list held inventory, favoring items in demand and quoting above
//! the best bid when one exists. A profit target multiplies the last trade
//! price when the book is one-sided.

use crate::agents::{decimal_between, AgentState};
use crate::selector;
use chrono::{DateTime, Utc};
use matching_engine::{MarketEngine, MarketSnapshot};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::debug;
use types::ids::{AgentId, ItemId};
use types::item::Item;
use types::order::{Order, Side};

/// A seller endowed with starting inventory and a profit target.
#[derive(Debug, Clone)]
pub struct Seller {
    pub state: AgentState,
    /// Markup applied to the last trade price when no bid is quoted
    pub profit_target: f64,
}

impl Seller {
    /// Create a seller with traits and a starting endowment drawn from the
    /// first ten catalog items (3 to 8 draws with replacement, accumulating).
    pub fn new(id: AgentId, cash: Decimal, catalog: &[Item], rng: &mut ChaCha8Rng) -> Self {
        let mut state = AgentState::new(id, cash, rng);

        let pool = &catalog[..catalog.len().min(10)];
        if !pool.is_empty() {
            let draws = rng.gen_range(3..=8);
            for _ in 0..draws {
                let item = &pool[rng.gen_range(0..pool.len())];
                state.add_item(item.id, rng.gen_range(1..=5));
            }
        }

        Self {
            state,
            profit_target: rng.gen_range(1.1..1.5),
        }
    }

    /// Maybe list a held item this step.
    pub fn act(
        &self,
        engine: &MarketEngine,
        step: u64,
        now: DateTime<Utc>,
        rng: &mut ChaCha8Rng,
    ) -> Option<Order> {
        let roll: f64 = rng.gen_range(0.0..1.0);
        if roll > 0.15 + self.state.patience * 0.2 {
            return None;
        }
        if self.state.inventory.is_empty() {
            return None;
        }

        let holdings: Vec<(ItemId, u32)> = self
            .state
            .inventory
            .iter()
            .map(|(id, qty)| (*id, *qty))
            .collect();

        let mut scored: Vec<((ItemId, u32), f64)> = Vec::new();
        for (item_id, held) in &holdings {
            let Ok(snapshot) = engine.get_market_snapshot(*item_id, now) else {
                continue;
            };
            let score = self.score_holding(&snapshot, *held);
            if score > 0.1 {
                scored.push(((*item_id, *held), score));
            }
        }

        let (item_id, held) = match selector::weighted_choice(&scored, rng) {
            Some(pair) => *pair,
            None => holdings[rng.gen_range(0..holdings.len())],
        };

        let snapshot = engine.get_market_snapshot(item_id, now).ok()?;
        let price = self.ask_price(&snapshot, rng);
        if price <= Decimal::ZERO {
            return None;
        }

        let cap = held.min(rng.gen_range(1..=3));
        let quantity = rng.gen_range(1..=cap);

        debug!(
            agent_id = %self.state.id,
            item_id = %item_id,
            price = %price,
            quantity,
            step,
            "seller placing ask"
        );
        Some(Order::new(
            item_id,
            self.state.id.clone(),
            Side::SELL,
            price,
            quantity,
            now,
        ))
    }

    /// Urge to sell a holding: demand, achievable price and stock pressure,
    /// scaled by market knowledge.
    fn score_holding(&self, snapshot: &MarketSnapshot, held: u32) -> f64 {
        let demand = (snapshot.volume_24h as f64 / 5.0).min(1.0);
        let price_score = snapshot
            .best_bid
            .and_then(|b| b.to_f64())
            .map(|b| (b / 100.0).min(1.0))
            .unwrap_or(0.5);
        let urgency = (held as f64 / 10.0).min(1.0);

        (0.4 * demand + 0.4 * price_score + 0.2 * urgency) * self.state.market_knowledge
    }

    /// Ask above the bid, or last price times the profit target, or a blind
    /// quote for unquoted items. Risk appetite nudges the result.
    fn ask_price(&self, snapshot: &MarketSnapshot, rng: &mut ChaCha8Rng) -> Decimal {
        let base = if let Some(bid) = snapshot.best_bid {
            bid * decimal_between(rng, 1.01, 1.05)
        } else if let Some(last) = snapshot.last_price {
            last * Decimal::from_f64(self.profit_target).unwrap_or(Decimal::ONE)
        } else {
            decimal_between(rng, 10.0, 100.0)
        };

        let adjustment =
            Decimal::from_f64(1.0 + (self.state.risk_tolerance - 0.5) * 0.1).unwrap_or(Decimal::ONE);
        (base * adjustment).round_dp(2)
    }
}
