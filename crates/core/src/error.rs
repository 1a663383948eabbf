//! Domain error model.

use thiserror::Error;

use crate::money::Quantity;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Coarse classification of a [`DomainError`].
///
/// Transport layers map kinds to tenant-visible responses; the domain never
/// produces transport artifacts itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidArgument,
    InsufficientStock,
    Conflict,
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// ownership, stock levels, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A requested product, category, organization or inventory row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The target belongs to another tenant.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A value failed validation (non-positive quantity, blank name, inactive product).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested quantity exceeds what is on hand.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        requested: Quantity,
        available: Quantity,
    },

    /// A uniqueness rule was violated (e.g. duplicate product name).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn insufficient_stock(requested: Quantity, available: Quantity) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Forbidden(_) => ErrorKind::Forbidden,
            DomainError::InvalidArgument(_) | DomainError::InvalidId(_) => {
                ErrorKind::InvalidArgument
            }
            DomainError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            DomainError::Conflict(_) => ErrorKind::Conflict,
        }
    }
}
