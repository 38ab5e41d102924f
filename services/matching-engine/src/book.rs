//! Derived order book views
//!
//! Built on demand from the authoritative order store; never cached. Buy
//! entries come best bid first (price descending), sell entries best ask
//! first (price ascending), same-price entries in arrival order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use types::ids::{ItemId, OrderId};
use types::order::{Order, Side};

/// One active order as shown in the book
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookEntry {
    pub id: OrderId,
    pub price: Decimal,
    /// Remaining (unfilled) quantity
    pub quantity: u32,
    /// price × remaining
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl BookEntry {
    fn from_order(order: &Order) -> Self {
        let remaining = order.remaining_quantity();
        Self {
            id: order.id,
            price: order.price,
            quantity: remaining,
            total: order.price * Decimal::from(remaining),
            created_at: order.created_at,
        }
    }
}

/// Both sides of the book for one item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBookView {
    pub item_id: ItemId,
    pub buy_orders: Vec<BookEntry>,
    pub sell_orders: Vec<BookEntry>,
}

/// Build the book view for an item from all live orders
///
/// `depth` caps the number of entries per side.
pub(crate) fn build_view<'a>(
    item_id: ItemId,
    orders: impl Iterator<Item = &'a Order>,
    depth: usize,
) -> OrderBookView {
    let mut buys: Vec<&Order> = Vec::new();
    let mut sells: Vec<&Order> = Vec::new();

    for order in orders {
        if order.item_id != item_id || !order.is_active() {
            continue;
        }
        match order.side {
            Side::BUY => buys.push(order),
            Side::SELL => sells.push(order),
        }
    }

    buys.sort_by(|a, b| {
        b.price
            .cmp(&a.price)
            .then_with(|| a.sequence.cmp(&b.sequence))
    });
    sells.sort_by(|a, b| {
        a.price
            .cmp(&b.price)
            .then_with(|| a.sequence.cmp(&b.sequence))
    });

    OrderBookView {
        item_id,
        buy_orders: buys
            .into_iter()
            .take(depth)
            .map(BookEntry::from_order)
            .collect(),
        sell_orders: sells
            .into_iter()
            .take(depth)
            .map(BookEntry::from_order)
            .collect(),
    }
}
