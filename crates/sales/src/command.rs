use serde::{Deserialize, Serialize};

use pricetide_core::{ProductId, Quantity, StationId};

/// One requested line of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// Command: Sell.
///
/// Tenant and actor are supplied separately by the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sell {
    pub lines: Vec<SaleLine>,
    pub notes: Option<String>,
    pub station_id: Option<StationId>,
}
