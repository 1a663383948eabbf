//! Infrastructure layer: storage ports, orchestration services and the
//! background price correction runner.
//!
//! Domain crates decide; this crate loads rows, hands them to the pure
//! decision functions and commits the outcome with optimistic concurrency.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod price_correction;
pub mod queries;
pub mod sales;
pub mod store;

mod retry;
#[cfg(test)]
mod testing;

pub use catalog::CatalogService;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LedgerConfig;
pub use engine::{AddStock, AdjustStock, InventoryLedgerEngine, RemoveStock};
pub use error::{LedgerError, StoreError};
pub use price_correction::{CorrectionSummary, PriceCorrectionJob, PriceCorrectionRunner};
pub use queries::{InventorySnapshot, LedgerQueries, SalesStats};
pub use sales::SalesProcessor;
pub use store::{CatalogStore, CommitBatch, InMemoryStore, LedgerStore};
