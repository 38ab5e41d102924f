//! Candidate selection for price-time priority matching
//!
//! Pure functions over the order store. For an incoming BUY the candidates
//! are active SELLs at or below the bid, best (lowest) price first; for an
//! incoming SELL the candidates are active BUYs at or above the ask, best
//! (highest) price first. Ties at one price level break by arrival sequence,
//! oldest first. Orders from the taker's own agent never match.

use std::collections::HashMap;
use types::ids::OrderId;
use types::order::{Order, Side};

/// Collect matchable resting orders for a taker, sorted by priority
///
/// `Order::can_match_with` carries the compatibility rules (same item,
/// opposite side, different agent, both active, crossing prices); this
/// function adds the priority ordering.
pub fn candidate_ids(orders: &HashMap<OrderId, Order>, taker: &Order) -> Vec<OrderId> {
    let mut candidates: Vec<&Order> = orders
        .values()
        .filter(|resting| taker.can_match_with(resting))
        .collect();

    match taker.side {
        Side::BUY => candidates.sort_by(|a, b| {
            a.price
                .cmp(&b.price)
                .then_with(|| a.sequence.cmp(&b.sequence))
        }),
        Side::SELL => candidates.sort_by(|a, b| {
            b.price
                .cmp(&a.price)
                .then_with(|| a.sequence.cmp(&b.sequence))
        }),
    }

    candidates.into_iter().map(|o| o.id).collect()
}

/// Quantity exchanged when two compatible orders meet
pub fn fill_quantity(taker: &Order, maker: &Order) -> u32 {
    taker.remaining_quantity().min(maker.remaining_quantity())
}
