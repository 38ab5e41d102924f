//! Matching engine core
//!
//! `MarketEngine` owns the item catalog, every order ever submitted, and the
//! transaction log. Submission validates, persists, then immediately matches
//! the incoming order against resting compatible orders; the periodic
//! `match_orders` sweep re-checks the whole book as a safety net. Execution
//! price is always the resting order's limit price.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use types::errors::MarketError;
use types::ids::{AgentId, ItemId, OrderId};
use types::item::Item;
use types::order::{Order, Side};
use types::transaction::Transaction;

use crate::book::{self, OrderBookView};
use crate::matching;
use crate::snapshot::{self, MarketSnapshot, PriceTrend};

/// In-memory continuous double-auction engine
#[derive(Debug)]
pub struct MarketEngine {
    /// Item catalog, iterated in id order
    items: BTreeMap<ItemId, Item>,
    /// Authoritative store of all orders, any status
    orders: HashMap<OrderId, Order>,
    /// Executed transactions in execution order
    transactions: Vec<Transaction>,
    /// Next arrival ordinal for accepted orders
    next_sequence: u64,
    /// Next transaction sequence
    next_transaction_sequence: u64,
}

impl MarketEngine {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            orders: HashMap::new(),
            transactions: Vec::new(),
            next_sequence: 1,
            next_transaction_sequence: 1,
        }
    }

    /// Add an item to the catalog
    pub fn add_item(&mut self, item: Item) -> Result<(), MarketError> {
        if self.items.contains_key(&item.id) {
            return Err(MarketError::DuplicateItem {
                item_id: item.id.as_u32(),
            });
        }
        debug!(item_id = %item.id, name = %item.name, "item added to catalog");
        self.items.insert(item.id, item);
        Ok(())
    }

    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.items.get(&item_id)
    }

    /// Catalog items in id order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Submit an order: validate, persist, then match immediately
    ///
    /// Returns the order as stored after matching (possibly partially or
    /// completely filled). Validation failures reject the order before any
    /// state change.
    pub fn submit_order(
        &mut self,
        mut order: Order,
        now: DateTime<Utc>,
    ) -> Result<Order, MarketError> {
        self.validate_order(&order)?;

        order.sequence = self.next_sequence;
        self.next_sequence += 1;
        order.created_at = now;

        info!(
            order_id = %order.id,
            agent_id = %order.agent_id,
            item_id = %order.item_id,
            side = ?order.side,
            price = %order.price,
            quantity = order.quantity,
            "order submitted"
        );

        let order_id = order.id;
        let taker_view = order.clone();
        self.orders.insert(order_id, order);

        let candidates = matching::candidate_ids(&self.orders, &taker_view);
        self.execute_matches(order_id, &candidates, now);

        Ok(self
            .orders
            .get(&order_id)
            .cloned()
            .expect("submitted order present in store"))
    }

    fn validate_order(&self, order: &Order) -> Result<(), MarketError> {
        if !self.items.contains_key(&order.item_id) {
            return Err(MarketError::invalid_order(format!(
                "unknown item: {}",
                order.item_id
            )));
        }
        if order.quantity == 0 {
            return Err(MarketError::invalid_order("quantity must be at least 1"));
        }
        if order.price <= rust_decimal::Decimal::ZERO {
            return Err(MarketError::invalid_order("price must be positive"));
        }
        Ok(())
    }

    /// Walk the candidate list and execute fills against the taker
    ///
    /// Candidates come pre-sorted by priority; each is consumed at its own
    /// limit price until the taker is exhausted.
    fn execute_matches(
        &mut self,
        taker_id: OrderId,
        candidates: &[OrderId],
        now: DateTime<Utc>,
    ) -> Vec<Transaction> {
        let mut created = Vec::new();

        for &maker_id in candidates {
            let Some(taker) = self.orders.get(&taker_id) else {
                break;
            };
            if !taker.is_active() {
                break;
            }
            let taker_side = taker.side;
            let taker_agent = taker.agent_id.clone();
            let item_id = taker.item_id;

            let Some(maker) = self.orders.get(&maker_id) else {
                continue;
            };
            if !maker.is_active() {
                continue;
            }

            let quantity = matching::fill_quantity(taker, maker);
            let price = maker.price;
            let maker_agent = maker.agent_id.clone();

            let (buy_order_id, sell_order_id, buyer_id, seller_id) = match taker_side {
                Side::BUY => (taker_id, maker_id, taker_agent, maker_agent),
                Side::SELL => (maker_id, taker_id, maker_agent, taker_agent),
            };

            let tx = Transaction::new(
                self.next_transaction_sequence,
                item_id,
                buy_order_id,
                sell_order_id,
                buyer_id,
                seller_id,
                price,
                quantity,
                now,
            );
            self.next_transaction_sequence += 1;
            debug_assert!(tx.validate_no_self_trade());

            if let Some(maker) = self.orders.get_mut(&maker_id) {
                maker.add_fill(quantity);
            }
            if let Some(taker) = self.orders.get_mut(&taker_id) {
                taker.add_fill(quantity);
            }

            info!(
                transaction_id = %tx.id,
                item_id = %tx.item_id,
                price = %tx.price,
                quantity = tx.quantity,
                buyer_id = %tx.buyer_id,
                seller_id = %tx.seller_id,
                "transaction executed"
            );

            created.push(tx.clone());
            self.transactions.push(tx);
        }

        created
    }

    /// Global sweep: re-match every active order, oldest first
    ///
    /// Idempotent; a book exhausted by submission-time matching yields no
    /// transactions.
    pub fn match_orders(&mut self, now: DateTime<Utc>) -> Vec<Transaction> {
        let mut active: Vec<(u64, OrderId)> = self
            .orders
            .values()
            .filter(|o| o.is_active())
            .map(|o| (o.sequence, o.id))
            .collect();
        active.sort_unstable_by_key(|(sequence, _)| *sequence);

        let mut created = Vec::new();
        for (_, taker_id) in active {
            let taker = match self.orders.get(&taker_id) {
                Some(o) if o.is_active() && o.remaining_quantity() > 0 => o.clone(),
                _ => continue,
            };
            let candidates = matching::candidate_ids(&self.orders, &taker);
            if candidates.is_empty() {
                continue;
            }
            created.extend(self.execute_matches(taker_id, &candidates, now));
        }

        created
    }

    /// Cancel an order on behalf of its owner
    ///
    /// True only when the order exists, belongs to the agent, and is still
    /// active. Every failure shape is false, never an error; a second
    /// cancel of the same order is therefore false.
    pub fn cancel_order(&mut self, order_id: &OrderId, agent_id: &AgentId) -> bool {
        match self.orders.get_mut(order_id) {
            Some(order) if order.agent_id == *agent_id && order.is_active() => {
                order.cancel();
                info!(order_id = %order_id, agent_id = %agent_id, "order cancelled");
                true
            }
            Some(order) => {
                warn!(
                    order_id = %order_id,
                    agent_id = %agent_id,
                    owner = %order.agent_id,
                    status = ?order.status,
                    "cancel rejected"
                );
                false
            }
            None => {
                warn!(order_id = %order_id, "cancel requested for unknown order");
                false
            }
        }
    }

    pub fn get_order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Orders still open for matching, engine-wide
    pub fn active_order_count(&self) -> usize {
        self.orders.values().filter(|o| o.is_active()).count()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Derived book view for an item, capped at `depth` entries per side
    pub fn get_order_book(
        &self,
        item_id: ItemId,
        depth: usize,
    ) -> Result<OrderBookView, MarketError> {
        if !self.items.contains_key(&item_id) {
            return Err(MarketError::ItemNotFound {
                item_id: item_id.as_u32(),
            });
        }
        Ok(book::build_view(item_id, self.orders.values(), depth))
    }

    /// Point-in-time market data for an item
    pub fn get_market_snapshot(
        &self,
        item_id: ItemId,
        now: DateTime<Utc>,
    ) -> Result<MarketSnapshot, MarketError> {
        let item = self.items.get(&item_id).ok_or(MarketError::ItemNotFound {
            item_id: item_id.as_u32(),
        })?;
        Ok(snapshot::compute(
            item,
            self.orders.values(),
            &self.transactions,
            now,
        ))
    }

    /// Snapshots for the whole catalog, in item id order
    pub fn market_snapshots(&self, now: DateTime<Utc>) -> Vec<MarketSnapshot> {
        self.items
            .values()
            .map(|item| snapshot::compute(item, self.orders.values(), &self.transactions, now))
            .collect()
    }

    /// Direction of recent trade prices for an item
    pub fn price_trend(&self, item_id: ItemId) -> PriceTrend {
        snapshot::classify_trend(&self.transactions, item_id)
    }
}

impl Default for MarketEngine {
    fn default() -> Self {
        Self::new()
    }
}
