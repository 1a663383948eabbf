//! Price correction: decay prices of products that sit idle while their
//! organization keeps selling.
//!
//! [`PriceCorrectionJob`] performs one deterministic pass for a given instant;
//! [`PriceCorrectionRunner`] drives it from a background thread.

pub mod job;
pub mod runner;

pub use job::{CorrectionSummary, PriceCorrectionJob};
pub use runner::{PriceCorrectionRunner, PriceCorrectionRunnerHandle};
