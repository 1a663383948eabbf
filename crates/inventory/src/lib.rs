//! Inventory domain module.
//!
//! This crate contains the stock/price record for one product and the
//! immutable transaction that accompanies each of its mutations, implemented
//! purely as deterministic domain logic (no IO, no storage).

pub mod movement;
pub mod record;
pub mod transaction;

pub use movement::{MovementContext, StockMovement};
pub use record::Inventory;
pub use transaction::{InventoryTransaction, TransactionKind};
