//! Market data views derived from live orders and executed transactions
//!
//! Snapshots answer "what does this market look like right now": best
//! prices, last trade, trailing 24h activity. The price trend classifier
//! compares the three most recent trade prices against the three before
//! them, which is deliberately coarse; agents only need a directional hint.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::ItemId;
use types::item::Item;
use types::order::{Order, Side};
use types::transaction::Transaction;

/// Direction of recent trade prices for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTrend {
    Up,
    Down,
    Stable,
}

/// Point-in-time market data for one item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    pub item_id: ItemId,
    pub item_name: String,
    /// Highest active buy price
    pub best_bid: Option<Decimal>,
    /// Lowest active sell price
    pub best_ask: Option<Decimal>,
    /// Price of the most recent transaction, any age
    pub last_price: Option<Decimal>,
    /// Units traded in the 24h before `updated_at`
    pub volume_24h: u64,
    /// Cash moved in the 24h before `updated_at`
    pub value_24h: Decimal,
    /// best_ask − best_bid when both sides are quoted
    pub spread: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Midpoint of the quoted spread
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::from(2)),
            _ => None,
        }
    }
}

/// Compute the snapshot for an item
pub(crate) fn compute<'a>(
    item: &Item,
    orders: impl Iterator<Item = &'a Order>,
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> MarketSnapshot {
    let mut best_bid: Option<Decimal> = None;
    let mut best_ask: Option<Decimal> = None;

    for order in orders {
        if order.item_id != item.id || !order.is_active() {
            continue;
        }
        match order.side {
            Side::BUY => {
                if best_bid.map_or(true, |p| order.price > p) {
                    best_bid = Some(order.price);
                }
            }
            Side::SELL => {
                if best_ask.map_or(true, |p| order.price < p) {
                    best_ask = Some(order.price);
                }
            }
        }
    }

    let last_price = transactions
        .iter()
        .rev()
        .find(|tx| tx.item_id == item.id)
        .map(|tx| tx.price);

    let window_start = now - Duration::hours(24);
    let mut volume_24h: u64 = 0;
    let mut value_24h = Decimal::ZERO;
    for tx in transactions {
        if tx.item_id == item.id && tx.executed_at >= window_start {
            volume_24h += u64::from(tx.quantity);
            value_24h += tx.total_value();
        }
    }

    let spread = match (best_bid, best_ask) {
        (Some(bid), Some(ask)) => Some(ask - bid),
        _ => None,
    };

    MarketSnapshot {
        item_id: item.id,
        item_name: item.name.clone(),
        best_bid,
        best_ask,
        last_price,
        volume_24h,
        value_24h,
        spread,
        updated_at: now,
    }
}

/// Classify the price direction from the last transactions of an item
///
/// Needs at least six trades; compares the mean of the three most recent
/// prices against the mean of the three before them, with a 5% dead band.
pub(crate) fn classify_trend(transactions: &[Transaction], item_id: ItemId) -> PriceTrend {
    let prices: Vec<Decimal> = transactions
        .iter()
        .rev()
        .filter(|tx| tx.item_id == item_id)
        .take(10)
        .map(|tx| tx.price)
        .collect();

    if prices.len() < 6 {
        return PriceTrend::Stable;
    }

    let mean = |slice: &[Decimal]| -> Decimal {
        slice.iter().sum::<Decimal>() / Decimal::from(slice.len() as u32)
    };
    let recent = mean(&prices[0..3]);
    let older = mean(&prices[3..6]);

    if recent > older * Decimal::new(105, 2) {
        PriceTrend::Up
    } else if recent < older * Decimal::new(95, 2) {
        PriceTrend::Down
    } else {
        PriceTrend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use types::ids::{AgentId, ItemId, OrderId};
    use types::item::ItemCategory;

    fn test_item() -> Item {
        Item::new(
            ItemId::new(1),
            "Test Item",
            ItemCategory::TradingCards,
            "Edition 1",
            100,
            "",
            Utc::now(),
        )
    }

    fn order(side: Side, price: &str) -> Order {
        Order::new(
            ItemId::new(1),
            AgentId::new("agent_1"),
            side,
            Decimal::from_str(price).unwrap(),
            5,
            Utc::now(),
        )
    }

    fn tx(price: &str, quantity: u32, executed_at: DateTime<Utc>) -> Transaction {
        Transaction::new(
            0,
            ItemId::new(1),
            OrderId::new(),
            OrderId::new(),
            AgentId::new("buyer_1"),
            AgentId::new("seller_1"),
            Decimal::from_str(price).unwrap(),
            quantity,
            executed_at,
        )
    }

    #[test]
    fn test_empty_market_snapshot() {
        let item = test_item();
        let snapshot = compute(&item, std::iter::empty(), &[], Utc::now());

        assert_eq!(snapshot.best_bid, None);
        assert_eq!(snapshot.best_ask, None);
        assert_eq!(snapshot.last_price, None);
        assert_eq!(snapshot.spread, None);
        assert_eq!(snapshot.volume_24h, 0);
        assert_eq!(snapshot.value_24h, Decimal::ZERO);
        assert_eq!(snapshot.mid_price(), None);
    }

    #[test]
    fn test_best_prices_and_spread() {
        let item = test_item();
        let orders = vec![
            order(Side::BUY, "9.50"),
            order(Side::BUY, "9.00"),
            order(Side::SELL, "10.50"),
            order(Side::SELL, "11.00"),
        ];

        let snapshot = compute(&item, orders.iter(), &[], Utc::now());

        assert_eq!(snapshot.best_bid, Some(Decimal::from_str("9.50").unwrap()));
        assert_eq!(snapshot.best_ask, Some(Decimal::from_str("10.50").unwrap()));
        assert_eq!(snapshot.spread, Some(Decimal::from_str("1.00").unwrap()));
        assert_eq!(
            snapshot.mid_price(),
            Some(Decimal::from_str("10.00").unwrap())
        );
    }

    #[test]
    fn test_last_price_and_24h_window() {
        let item = test_item();
        let now = Utc::now();
        let transactions = vec![
            tx("8.00", 10, now - Duration::hours(30)),
            tx("9.00", 2, now - Duration::hours(3)),
            tx("10.00", 3, now - Duration::minutes(5)),
        ];

        let snapshot = compute(&item, std::iter::empty(), &transactions, now);

        assert_eq!(snapshot.last_price, Some(Decimal::from_str("10.00").unwrap()));
        // The 30h-old trade falls outside the window
        assert_eq!(snapshot.volume_24h, 5);
        assert_eq!(snapshot.value_24h, Decimal::from_str("48.00").unwrap());
    }

    #[test]
    fn test_trend_needs_six_trades() {
        let now = Utc::now();
        let transactions: Vec<Transaction> =
            (0..5).map(|_| tx("10.00", 1, now)).collect();
        assert_eq!(classify_trend(&transactions, ItemId::new(1)), PriceTrend::Stable);
    }

    #[test]
    fn test_trend_up_down_stable() {
        let now = Utc::now();

        // Oldest first in the store; classifier reads newest first
        let rising: Vec<Transaction> = ["10.00", "10.00", "10.00", "12.00", "12.00", "12.00"]
            .iter()
            .map(|p| tx(p, 1, now))
            .collect();
        assert_eq!(classify_trend(&rising, ItemId::new(1)), PriceTrend::Up);

        let falling: Vec<Transaction> = ["12.00", "12.00", "12.00", "10.00", "10.00", "10.00"]
            .iter()
            .map(|p| tx(p, 1, now))
            .collect();
        assert_eq!(classify_trend(&falling, ItemId::new(1)), PriceTrend::Down);

        let flat: Vec<Transaction> = ["10.00", "10.00", "10.00", "10.20", "10.20", "10.20"]
            .iter()
            .map(|p| tx(p, 1, now))
            .collect();
        assert_eq!(classify_trend(&flat, ItemId::new(1)), PriceTrend::Stable);
    }

    #[test]
    fn test_trend_ignores_other_items() {
        let now = Utc::now();
        let mut transactions: Vec<Transaction> = ["10.00", "10.00", "10.00", "12.00", "12.00", "12.00"]
            .iter()
            .map(|p| tx(p, 1, now))
            .collect();
        for t in &mut transactions {
            t.item_id = ItemId::new(2);
        }
        assert_eq!(classify_trend(&transactions, ItemId::new(1)), PriceTrend::Stable);
    }
}
