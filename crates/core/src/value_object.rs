//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their
//! attribute values. `Money { 2.5000 }` equals any other `Money { 2.5000 }`,
//! while two products with identical names are still different entities.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by value. To "modify" one, build a
/// new one (e.g. `price + step` returns a fresh `Money`).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
