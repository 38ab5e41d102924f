//! Buyer agent
//!
//! Buyers favor liquid items with tight spreads and rising prices, then bid
//! slightly under the ask. Everything random comes from the run RNG passed
//! into `act`; the same seed replays the same decisions.

use crate::agents::{decimal_between, AgentState};
use crate::selector;
use chrono::{DateTime, Utc};
use matching_engine::{MarketEngine, MarketSnapshot, PriceTrend};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::debug;
use types::ids::{AgentId, ItemId};
use types::item::{Item, ItemCategory};
use types::order::{Order, Side};

/// A buyer with category preferences and a per-item budget.
#[derive(Debug, Clone)]
pub struct Buyer {
    pub state: AgentState,
    /// One to three of the primary categories
    pub preferred_categories: Vec<ItemCategory>,
    /// Cap on what a single order may spend, set from starting cash
    pub budget_per_item: Decimal,
}

impl Buyer {
    /// Create a buyer with sampled traits, preferences and budget.
    pub fn new(id: AgentId, cash: Decimal, rng: &mut ChaCha8Rng) -> Self {
        let state = AgentState::new(id, cash, rng);
        let category_count = rng.gen_range(1..=3);
        let preferred_categories: Vec<ItemCategory> = ItemCategory::PRIMARY
            .choose_multiple(rng, category_count)
            .copied()
            .collect();
        let budget_per_item = (cash * decimal_between(rng, 0.05, 0.2)).round_dp(2);

        Self {
            state,
            preferred_categories,
            budget_per_item,
        }
    }

    /// Maybe place a buy order this step.
    pub fn act(
        &self,
        engine: &MarketEngine,
        step: u64,
        now: DateTime<Utc>,
        rng: &mut ChaCha8Rng,
    ) -> Option<Order> {
        let roll: f64 = rng.gen_range(0.0..1.0);
        if roll > 0.1 + self.state.patience * 0.3 {
            return None;
        }

        let preferred: Vec<&Item> = engine
            .items()
            .filter(|item| self.preferred_categories.contains(&item.category))
            .collect();
        let candidates: Vec<&Item> = if preferred.is_empty() {
            engine.items().collect()
        } else {
            preferred
        };
        if candidates.is_empty() {
            return None;
        }

        let mut scored: Vec<(ItemId, f64)> = Vec::new();
        for item in &candidates {
            let Ok(snapshot) = engine.get_market_snapshot(item.id, now) else {
                continue;
            };
            let score = self.score_item(&snapshot, engine.price_trend(item.id));
            if score > 0.1 {
                scored.push((item.id, score));
            }
        }

        let item_id = match selector::weighted_choice(&scored, rng) {
            Some(id) => *id,
            None => candidates[rng.gen_range(0..candidates.len())].id,
        };

        let snapshot = engine.get_market_snapshot(item_id, now).ok()?;
        let price = self.bid_price(&snapshot, rng);
        if price <= Decimal::ZERO {
            return None;
        }

        let max_quantity = (self.budget_per_item / price)
            .floor()
            .to_u32()
            .unwrap_or(1)
            .max(1);
        let mut quantity = rng.gen_range(1..=max_quantity);
        if !self.state.can_afford(price, quantity) {
            quantity = (self.state.cash / price).floor().to_u32().unwrap_or(0);
        }
        if quantity < 1 {
            return None;
        }

        debug!(
            agent_id = %self.state.id,
            item_id = %item_id,
            price = %price,
            quantity,
            step,
            "buyer placing bid"
        );
        Some(Order::new(
            item_id,
            self.state.id.clone(),
            Side::BUY,
            price,
            quantity,
            now,
        ))
    }

    /// Attractiveness of an item: liquidity, spread tightness and trend,
    /// weighted and scaled by market knowledge.
    fn score_item(&self, snapshot: &MarketSnapshot, trend: PriceTrend) -> f64 {
        let liquidity = (snapshot.volume_24h as f64 / 10.0).min(1.0);
        let spread_term = snapshot
            .spread
            .and_then(|s| s.to_f64())
            .map(|s| s / 10.0)
            .unwrap_or(0.0);
        let spread_score = 1.0 - spread_term.min(1.0);
        let trend_score = if trend == PriceTrend::Up { 0.8 } else { 0.5 };

        (0.3 * liquidity + 0.4 * spread_score + 0.3 * trend_score) * self.state.market_knowledge
    }

    /// Bid under the ask when one exists, around the last trade otherwise,
    /// blind when the item has never traded. Risk appetite nudges the result.
    fn bid_price(&self, snapshot: &MarketSnapshot, rng: &mut ChaCha8Rng) -> Decimal {
        let base = if let Some(ask) = snapshot.best_ask {
            ask * decimal_between(rng, 0.95, 0.99)
        } else if let Some(last) = snapshot.last_price {
            last * decimal_between(rng, 0.9, 1.1)
        } else {
            decimal_between(rng, 5.0, 50.0)
        };

        let adjustment =
            Decimal::from_f64(1.0 + (self.state.risk_tolerance - 0.5) * 0.2).unwrap_or(Decimal::ONE);
        (base * adjustment).round_dp(2)
    }
}
