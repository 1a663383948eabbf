use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricetide_core::{InventoryId, Money, Quantity, StationId, TransactionId, UserId};

/// What kind of mutation a transaction records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Sale,
    Add,
    Remove,
    Adjustment,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Sale => "SALE",
            TransactionKind::Add => "ADD",
            TransactionKind::Remove => "REMOVE",
            TransactionKind::Adjustment => "ADJUSTMENT",
        }
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit entry for one stock/price mutation.
///
/// Written once, together with the inventory row it describes, and never
/// updated or deleted. `price_before`/`price_after` are always filled, even
/// when the mutation did not touch the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryTransaction {
    pub id: TransactionId,
    pub inventory_id: InventoryId,
    pub kind: TransactionKind,
    pub quantity_change: Quantity,
    pub quantity_before: Quantity,
    pub quantity_after: Quantity,
    pub price_before: Money,
    pub price_after: Money,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    /// `None` for system-initiated entries (price corrections).
    pub actor: Option<UserId>,
    pub station_id: Option<StationId>,
    pub created_at: DateTime<Utc>,
}

impl InventoryTransaction {
    /// Units sold by a `SALE` entry (zero for every other kind).
    pub fn units_sold(&self) -> Quantity {
        match self.kind {
            TransactionKind::Sale => -self.quantity_change,
            _ => Quantity::ZERO,
        }
    }

    /// Revenue of a `SALE` entry, charged at the pre-sale price.
    pub fn revenue(&self) -> Money {
        self.units_sold() * self.price_before
    }
}
