use chrono::{DateTime, Utc};

use pricetide_core::{StationId, UserId};

use crate::record::Inventory;
use crate::transaction::InventoryTransaction;

/// Who/why/when metadata attached to a mutation's transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementContext {
    pub actor: Option<UserId>,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    pub station_id: Option<StationId>,
    pub at: DateTime<Utc>,
}

impl MovementContext {
    pub fn by(actor: Option<UserId>, at: DateTime<Utc>) -> Self {
        Self {
            actor,
            reference_id: None,
            notes: None,
            station_id: None,
            at,
        }
    }

    pub fn with_reference(mut self, reference_id: Option<String>) -> Self {
        self.reference_id = reference_id;
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_station(mut self, station_id: Option<StationId>) -> Self {
        self.station_id = station_id;
        self
    }
}

/// Outcome of a decided mutation: the next row state plus the transaction
/// describing the transition. Both must be committed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMovement {
    pub inventory: Inventory,
    pub transaction: InventoryTransaction,
}
