//! Collectible items and categories
//!
//! Items are pure catalog records; market figures (best prices, volumes,
//! trends) are derived by the matching engine from live orders and
//! transactions, never stored on the item.

use crate::ids::ItemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a collectible item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemCategory {
    TradingCards,
    Figurines,
    Comics,
    VintageToys,
    Art,
    Other,
}

impl ItemCategory {
    /// All six categories
    pub const ALL: [ItemCategory; 6] = [
        ItemCategory::TradingCards,
        ItemCategory::Figurines,
        ItemCategory::Comics,
        ItemCategory::VintageToys,
        ItemCategory::Art,
        ItemCategory::Other,
    ];

    /// The five primary categories
    ///
    /// Catalog generation and buyer preferences draw from these; `Other`
    /// is a catch-all that never appears in generated markets.
    pub const PRIMARY: [ItemCategory; 5] = [
        ItemCategory::TradingCards,
        ItemCategory::Figurines,
        ItemCategory::Comics,
        ItemCategory::VintageToys,
        ItemCategory::Art,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ItemCategory::TradingCards => "Trading Cards",
            ItemCategory::Figurines => "Figurines",
            ItemCategory::Comics => "Comics",
            ItemCategory::VintageToys => "Vintage Toys",
            ItemCategory::Art => "Art",
            ItemCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A collectible item listed on the marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: ItemCategory,
    pub edition: String,
    pub total_supply: u32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        category: ItemCategory,
        edition: impl Into<String>,
        total_supply: u32,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            edition: edition.into(),
            total_supply,
            description: description.into(),
            created_at,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.category)
    }
}
