//! Catalog domain module: organizations, categories and products.
//!
//! Pure records and validation rules (no IO). Uniqueness checks that need to
//! see other rows are performed by the infrastructure layer using
//! [`same_name`].

pub mod category;
pub mod name;
pub mod organization;
pub mod product;

pub use category::{Category, RegisterCategory};
pub use name::{normalize_name, same_name};
pub use organization::{Organization, RegisterOrganization};
pub use product::{Product, RegisterProduct};
