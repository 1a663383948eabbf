//! Demand-based pricing policy.
//!
//! Pure functions only: prices step up on sales and step down on inactivity,
//! clamped to the product's bounds. A change whose `before` equals its `after`
//! means "already at the bound" and is never an error.

pub mod policy;

pub use policy::{PriceChange, PricingPolicy, decay, increase};
