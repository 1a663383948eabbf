use thiserror::Error;

use pricetide_core::{DomainError, ErrorKind, ProductId};
use pricetide_sales::SaleError;

/// Storage-level failure.
///
/// These are infrastructure errors (concurrency, isolation, backend) as
/// opposed to domain errors (validation, stock levels).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A row changed since it was read (version mismatch), or was created twice.
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    /// A uniqueness constraint rejected the write.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Error returned by the ledger services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// One line of a sale was rejected; nothing was written.
    #[error("sale rejected at line {line} (product {product_id}): {source}")]
    SaleLine {
        line: usize,
        product_id: ProductId,
        source: DomainError,
    },

    /// The row kept changing underneath us.
    #[error("gave up after {attempts} attempts: {message}")]
    Contention { attempts: u32, message: String },

    #[error("store error: {0}")]
    Store(StoreError),
}

impl LedgerError {
    /// Taxonomy kind for transport layers. `None` for backend failures that
    /// carry no domain meaning.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            LedgerError::Domain(e) => Some(e.kind()),
            LedgerError::SaleLine { source, .. } => Some(source.kind()),
            LedgerError::Contention { .. } => Some(ErrorKind::Conflict),
            LedgerError::Store(StoreError::Concurrency(_)) => Some(ErrorKind::Conflict),
            LedgerError::Store(_) => None,
        }
    }

    pub(crate) fn is_conflict(&self) -> bool {
        matches!(self, LedgerError::Store(StoreError::Concurrency(_)))
    }
}

impl From<StoreError> for LedgerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Duplicate(msg) => LedgerError::Domain(DomainError::Conflict(msg)),
            StoreError::TenantIsolation(msg) => LedgerError::Domain(DomainError::Forbidden(msg)),
            other => LedgerError::Store(other),
        }
    }
}

impl From<SaleError> for LedgerError {
    fn from(value: SaleError) -> Self {
        match value {
            SaleError::Line {
                line,
                product_id,
                source,
            } => LedgerError::SaleLine {
                line,
                product_id,
                source,
            },
            empty @ SaleError::Empty => LedgerError::Domain(empty.domain()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricetide_core::Quantity;

    #[test]
    fn store_errors_map_onto_domain_kinds() {
        let dup: LedgerError = StoreError::Duplicate("product name".into()).into();
        assert_eq!(dup.kind(), Some(ErrorKind::Conflict));

        let iso: LedgerError = StoreError::TenantIsolation("mixed batch".into()).into();
        assert_eq!(iso.kind(), Some(ErrorKind::Forbidden));

        let stale: LedgerError = StoreError::Concurrency("v1".into()).into();
        assert!(stale.is_conflict());
        assert_eq!(stale.kind(), Some(ErrorKind::Conflict));

        let backend: LedgerError = StoreError::Storage("lock poisoned".into()).into();
        assert_eq!(backend.kind(), None);
    }

    #[test]
    fn sale_line_keeps_index_and_product() {
        let product_id = ProductId::new();
        let err: LedgerError = SaleError::Line {
            line: 2,
            product_id,
            source: DomainError::insufficient_stock(Quantity::from(5), Quantity::from(3)),
        }
        .into();

        match &err {
            LedgerError::SaleLine { line: 2, product_id: p, .. } if *p == product_id => {}
            other => panic!("Expected SaleLine error, got {other:?}"),
        }
        assert_eq!(err.kind(), Some(ErrorKind::InsufficientStock));

        let empty: LedgerError = SaleError::Empty.into();
        assert_eq!(empty.kind(), Some(ErrorKind::InvalidArgument));
    }
}
