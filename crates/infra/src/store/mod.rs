//! Storage ports.
//!
//! Services are generic over these traits so the same orchestration runs
//! against the in-memory store (tests, simulation) and any durable backend.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use r#trait::{CatalogStore, CommitBatch, LedgerStore, SaleActivity};
