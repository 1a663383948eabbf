//! Optimistic concurrency primitives for versioned rows.

use crate::error::{DomainError, DomainResult};

/// A row whose writes are guarded by a monotonically increasing version.
///
/// Version `0` means "never persisted". Stores bump the version by one on every
/// successful write, so a reader that saw version `n` can later require that no
/// one else wrote in between.
pub trait Versioned {
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for a row write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking.
    Any,
    /// Require the row to be at an exact version (`0` = the row must not exist yet).
    Exact(u64),
}

impl ExpectedVersion {
    /// Expectation derived from the version a row was read at.
    pub fn of<V: Versioned>(row: &V) -> Self {
        ExpectedVersion::Exact(row.version())
    }

    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}
