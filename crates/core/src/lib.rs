//! `pricetide-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, fixed-precision amounts, the error taxonomy and the optimistic
//! version expectation used by every row write.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;
pub mod version;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::{CategoryId, InventoryId, ProductId, StationId, TenantId, TransactionId, UserId};
pub use money::{Money, Quantity};
pub use value_object::ValueObject;
pub use version::{ExpectedVersion, Versioned};
