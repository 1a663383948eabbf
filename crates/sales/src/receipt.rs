use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricetide_core::{Money, ProductId, Quantity, StationId};

/// Result of one sale line. `unit_price` is the price the customer paid (the
/// pre-sale price); `price_after` is the price now in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub total_price: Money,
    pub price_after: Money,
}

/// Consolidated receipt for a committed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub sale_id: String,
    pub lines: Vec<ReceiptLine>,
    pub total_amount: Money,
    pub notes: Option<String>,
    pub station_id: Option<StationId>,
    pub timestamp: DateTime<Utc>,
}
